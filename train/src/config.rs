//! Training program configuration format.

use crate::common::*;
use model_config::{Normalization, DEFAULT_DROPOUT};
use steering_dl::processor::DEFAULT_CORRECTION;

pub use dataset::*;
pub use logging::*;
pub use model::*;
pub use training::*;

/// The main training configuration.
///
/// Every section may be omitted from the file, in which case the defaults
/// are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub training: TrainingConfig,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        let config: Self = json5::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let ratio = self.dataset.validation_ratio.raw();
        ensure!(
            (0.0..=1.0).contains(&ratio),
            "dataset.validation_ratio must be in range [0, 1], but get {}",
            ratio
        );
        ensure!(
            self.training.lr.raw() > 0.0,
            "training.lr must be positive, but get {}",
            self.training.lr
        );
        Ok(())
    }
}

mod model {
    use super::*;

    /// The model configuration.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "kind")]
    pub enum ModelConfig {
        /// The built-in five-convolution steering network.
        BehavioralCloning {
            #[serde(default)]
            normalization: Normalization,
            #[serde(default = "default_dropout")]
            dropout: R64,
        },
        /// A layer list loaded from a json5 file.
        File { cfg_file: PathBuf },
    }

    impl Default for ModelConfig {
        fn default() -> Self {
            Self::BehavioralCloning {
                normalization: Normalization::default(),
                dropout: default_dropout(),
            }
        }
    }

    impl ModelConfig {
        /// Resolves the network description.
        pub fn load(&self) -> Result<model_config::Model> {
            let model = match *self {
                Self::BehavioralCloning {
                    normalization,
                    dropout,
                } => model_config::behavioral_cloning(normalization, dropout),
                Self::File { ref cfg_file } => model_config::Model::load(cfg_file)
                    .with_context(|| {
                        format!("failed to load model file '{}'", cfg_file.display())
                    })?,
            };
            Ok(model)
        }
    }

    fn default_dropout() -> R64 {
        r64(DEFAULT_DROPOUT)
    }
}

mod dataset {
    use super::*;

    /// Dataset options.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct DatasetConfig {
        /// Driving log files, concatenated in order.
        pub log_files: Vec<PathBuf>,
        /// The share of records held out for validation.
        pub validation_ratio: R64,
        /// Steering offset applied to the side camera frames.
        pub correction: R64,
        /// If set, every frame must have this `[height, width]`.
        pub image_size: Option<[usize; 2]>,
    }

    impl Default for DatasetConfig {
        fn default() -> Self {
            Self {
                log_files: vec![
                    "../Data/Track1/driving_log.csv".into(),
                    "../Data/Track1_reversed/driving_log.csv".into(),
                ],
                validation_ratio: r64(0.2),
                correction: r64(DEFAULT_CORRECTION),
                image_size: None,
            }
        }
    }
}

mod logging {
    use super::*;

    /// Data logging options.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct LoggingConfig {
        /// Each run creates a timestamped directory under it.
        pub dir: PathBuf,
        /// Write loss curves to TensorBoard event files.
        pub enable_events: bool,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                dir: "logs".into(),
                enable_events: true,
            }
        }
    }
}

mod training {
    use super::*;

    /// The training options.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct TrainingConfig {
        /// The number of records per batch. A batch holds four times as many samples.
        pub batch_size: NonZeroUsize,
        /// The number of passes.
        pub epochs: usize,
        /// The Adam learning rate.
        pub lr: R64,
        /// If set, makes the split and the shuffling order reproducible.
        pub seed: Option<u64>,
        /// Where the trained model is written.
        pub output_file: PathBuf,
        #[serde(with = "tch_serde::serde_device")]
        pub device: Device,
    }

    impl Default for TrainingConfig {
        fn default() -> Self {
            Self {
                batch_size: NonZeroUsize::new(128).unwrap(),
                epochs: 5,
                lr: r64(0.001),
                seed: None,
                output_file: "model.json".into(),
                device: Device::Cpu,
            }
        }
    }
}
