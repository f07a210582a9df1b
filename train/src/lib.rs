//! The training program for steering-dl project.

pub mod common;
pub mod config;
pub mod logging;
pub mod training;
pub mod utils;

use crate::{common::*, logging::EventLogger, training::EpochLosses};
use steering_dl::{
    dataset::{self, DatasetSplit},
    processor::SampleGeneratorInit,
};

/// The entry of training program.
pub fn start(config: Arc<config::Config>) -> Result<Vec<EpochLosses>> {
    config.validate()?;

    // create dirs and save config
    let logging_dir = utils::create_run_dir(&config.logging.dir)?;
    utils::save_config(&logging_dir, &*config)?;
    info!("logging to '{}'", logging_dir.display());

    // resolve and save the architecture
    let model_config = config.model.load()?;
    model_config.save(logging_dir.join(utils::MODEL_FILE_NAME))?;

    // load dataset
    info!("loading driving logs");
    let records = dataset::read_driving_logs(&config.dataset.log_files)?;
    let num_records = records.len();
    info!("loaded {} records", num_records);

    let mut rng = match config.training.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let DatasetSplit { train, validation } =
        dataset::train_validation_split(records, config.dataset.validation_ratio.raw(), &mut rng)?;
    info!(
        "{} training records and {} validation records",
        train.len(),
        validation.len()
    );
    ensure!(
        !train.is_empty(),
        "no training records left after holding out {} of {} records for validation",
        validation.len(),
        num_records
    );

    let init = SampleGeneratorInit {
        batch_size: config.training.batch_size,
        correction: config.dataset.correction.raw(),
        image_size: config.dataset.image_size,
        seed: None,
    };
    let train_generator = SampleGeneratorInit {
        seed: config.training.seed.map(|_| rng.gen()),
        ..init.clone()
    }
    .build(train)?;
    let validation_generator = SampleGeneratorInit {
        seed: config.training.seed.map(|_| rng.gen()),
        ..init
    }
    .build(validation)?;

    // start logger
    let event_logger = if config.logging.enable_events {
        Some(EventLogger::new(&logging_dir)?)
    } else {
        None
    };

    training::training_worker(
        &config,
        &model_config,
        train_generator,
        validation_generator,
        event_logger,
    )
}
