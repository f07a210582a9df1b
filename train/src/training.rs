//! The training loop.

use crate::{
    common::*,
    config::{Config, TrainingConfig},
    logging::EventLogger,
    utils::RateCounter,
};
use steering_dl::{
    model::{ModelArtifact, SteeringModel},
    processor::{Batch, SampleGenerator},
};

/// Mean losses of one pass. A loss is `None` when its subset had no steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochLosses {
    pub epoch: usize,
    pub train_loss: Option<f64>,
    pub validation_loss: Option<f64>,
}

/// Trains a fresh model on the training generator, evaluates it on the
/// validation generator after each pass, and saves the result.
pub fn training_worker(
    config: &Config,
    model_config: &model_config::Model,
    mut train_generator: SampleGenerator,
    mut validation_generator: SampleGenerator,
    mut event_logger: Option<EventLogger>,
) -> Result<Vec<EpochLosses>> {
    let TrainingConfig {
        epochs,
        lr,
        device,
        ref output_file,
        ..
    } = config.training;
    info!("use device {:?}", device);

    // init model
    info!("initializing model");
    debug!("model architecture\n{}", model_config);

    let vs = nn::VarStore::new(device);
    let model = SteeringModel::new(&vs.root(), model_config)?;
    let mut optimizer = nn::Adam::default().build(&vs, lr.raw())?;

    let train_steps = train_generator.steps_per_cycle();
    let validation_steps = validation_generator.steps_per_cycle();
    info!(
        "{} training steps and {} validation steps per epoch",
        train_steps, validation_steps
    );

    let mut rate_counter = RateCounter::with_second_interval();
    let mut training_step = 0;
    let mut history = Vec::with_capacity(epochs);

    for epoch in 1..=epochs {
        // training
        let mut loss_sum = 0.0;
        for batch in train_generator.by_ref().take(train_steps) {
            let Batch {
                images, targets, ..
            } = batch?.to_device(device);
            let num_samples = images.size()[0] as usize;

            let loss = model.loss(&images, &targets, true)?;
            optimizer.backward_step(&loss);
            let loss = f64::from(&loss);
            loss_sum += loss;

            if let Some(event_logger) = &mut event_logger {
                event_logger.log_step(training_step, loss)?;
            }
            training_step += 1;

            rate_counter.add(num_samples);
            if let Some(rate) = rate_counter.rate() {
                info!(
                    "epoch: {}\tstep: {}\tsamples: {}\tloss: {:.5}\t{:.2} samples/s",
                    epoch,
                    training_step,
                    rate_counter.total(),
                    loss,
                    rate
                );
            }
        }

        // validation
        let validation_loss_sum = tch::no_grad(|| {
            validation_generator
                .by_ref()
                .take(validation_steps)
                .try_fold(0.0, |sum, batch| {
                    let Batch {
                        images, targets, ..
                    } = batch?.to_device(device);
                    let loss = model.loss(&images, &targets, false)?;
                    Fallible::Ok(sum + f64::from(&loss))
                })
        })?;

        let losses = EpochLosses {
            epoch,
            train_loss: mean(loss_sum, train_steps),
            validation_loss: mean(validation_loss_sum, validation_steps),
        };
        info!(
            "epoch {}/{}\tloss: {}\tval_loss: {}",
            epoch,
            epochs,
            fmt_loss(losses.train_loss),
            fmt_loss(losses.validation_loss)
        );

        if let Some(event_logger) = &mut event_logger {
            event_logger.log_epoch(&losses)?;
        }
        history.push(losses);
    }

    ModelArtifact::new(&vs, &model)
        .save(output_file)
        .with_context(|| format!("failed to save model to '{}'", output_file.display()))?;
    info!("model has been saved to '{}'", output_file.display());

    Ok(history)
}

fn mean(sum: f64, steps: usize) -> Option<f64> {
    (steps > 0).then(|| sum / steps as f64)
}

fn fmt_loss(loss: Option<f64>) -> String {
    match loss {
        Some(loss) => format!("{:.5}", loss),
        None => "n/a".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_no_steps_is_none() {
        assert_eq!(mean(0.0, 0), None);
        assert_eq!(mean(3.0, 2), Some(1.5));
    }
}
