//! Data logging toolkit.

use crate::{common::*, training::EpochLosses};
use std::{fs::File, io::BufWriter};
use tfrecord::{EventWriter, EventWriterInit};

/// Writes loss curves to TensorBoard event files.
#[derive(Debug)]
pub struct EventLogger {
    event_writer: EventWriter<BufWriter<File>>,
}

impl EventLogger {
    /// Creates the event file under `<logging_dir>/events`.
    pub fn new(logging_dir: &Path) -> Result<Self> {
        let event_dir = logging_dir.join("events");
        fs::create_dir_all(&event_dir)?;

        let event_path_prefix = event_dir
            .join("steering-dl")
            .into_os_string()
            .into_string()
            .map_err(|path| format_err!("non-UTF-8 logging path {:?}", path))?;
        let event_writer = EventWriterInit::default().from_prefix(event_path_prefix, None)?;

        Ok(Self { event_writer })
    }

    pub fn log_step(&mut self, step: usize, loss: f64) -> Result<()> {
        self.event_writer
            .write_scalar("train/step_loss", step as i64, loss as f32)?;
        Ok(())
    }

    pub fn log_epoch(&mut self, losses: &EpochLosses) -> Result<()> {
        let EpochLosses {
            epoch,
            train_loss,
            validation_loss,
        } = *losses;

        if let Some(loss) = train_loss {
            self.event_writer
                .write_scalar("loss/train", epoch as i64, loss as f32)?;
        }
        if let Some(loss) = validation_loss {
            self.event_writer
                .write_scalar("loss/validation", epoch as i64, loss as f32)?;
        }
        Ok(())
    }
}
