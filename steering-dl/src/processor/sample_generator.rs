//! The augmenting batch generator.

use super::{flip_horizontal, ImageLoader};
use crate::{common::*, dataset::Record};

/// Steering offset applied to the side camera frames.
pub const DEFAULT_CORRECTION: f64 = 0.2;

/// Number of samples derived from each record.
pub const AUGMENTATION_FACTOR: usize = 4;

/// The origin of a sample within its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    /// The center camera frame with the recorded angle.
    Center,
    /// The mirrored center frame with the negated angle.
    Flipped,
    /// The left camera frame, steered back to the right.
    Left,
    /// The right camera frame, steered back to the left.
    Right,
}

/// One augmented training example.
#[derive(Debug)]
pub struct Sample {
    pub kind: SampleKind,
    /// `[height, width, 3]` RGB image.
    pub image: Tensor,
    pub steering: f64,
}

/// A group of aligned images and steering targets.
#[derive(Debug, TensorLike)]
pub struct Batch {
    /// `[batch, height, width, 3]` float images with raw 0-255 values.
    pub images: Tensor,
    /// `[batch, 1]` float targets.
    pub targets: Tensor,
    #[tensor_like(clone)]
    pub kinds: Vec<SampleKind>,
    /// Targets in full precision, aligned with `kinds`.
    #[tensor_like(clone)]
    pub steering: Vec<f64>,
}

impl Batch {
    pub fn from_samples(samples: Vec<Sample>) -> Result<Self> {
        if samples.is_empty() {
            return Ok(Self::empty());
        }

        let (images, kinds, steering) = samples
            .into_iter()
            .map(
                |Sample {
                     kind,
                     image,
                     steering,
                 }| (image, kind, steering),
            )
            .unzip_n_vec();

        let images = Tensor::f_stack(images.as_slice(), 0)
            .context("images in a batch must have identical sizes")?
            .to_kind(Kind::Float);
        let targets = {
            let values = steering.iter().map(|&value| value as f32).collect_vec();
            Tensor::of_slice(&values).view([-1, 1])
        };

        Ok(Self {
            images,
            targets,
            kinds,
            steering,
        })
    }

    pub fn empty() -> Self {
        Self {
            images: Tensor::zeros(&[0, 0, 0, 3], FLOAT_CPU),
            targets: Tensor::zeros(&[0, 1], FLOAT_CPU),
            kinds: vec![],
            steering: vec![],
        }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Options of [SampleGenerator].
#[derive(Debug, Clone)]
pub struct SampleGeneratorInit {
    /// The number of records consumed per batch.
    pub batch_size: NonZeroUsize,
    pub correction: f64,
    /// If set, the expected `[height, width]` of every frame.
    pub image_size: Option<[usize; 2]>,
    /// If set, makes the shuffling order reproducible.
    pub seed: Option<u64>,
}

impl Default for SampleGeneratorInit {
    fn default() -> Self {
        Self {
            batch_size: NonZeroUsize::new(32).unwrap(),
            correction: DEFAULT_CORRECTION,
            image_size: None,
            seed: None,
        }
    }
}

impl SampleGeneratorInit {
    pub fn build(self, records: Vec<Record>) -> Result<SampleGenerator> {
        let Self {
            batch_size,
            correction,
            image_size,
            seed,
        } = self;

        ensure!(correction.is_finite(), "correction must be finite");
        if records.is_empty() {
            warn!("the sample generator has no records and will only yield empty batches");
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(SampleGenerator {
            records,
            batch_size: batch_size.get(),
            correction,
            loader: ImageLoader::new(image_size),
            rng,
            offset: 0,
            cycle: 0,
        })
    }
}

/// An endless iterator of shuffled, augmented batches over a record subset.
///
/// Each record expands to [AUGMENTATION_FACTOR] samples: the center frame,
/// its mirror image with negated angle, and both side frames with corrected
/// angles. After the subset is exhausted, it is reshuffled and the iteration
/// starts over, so `next()` never returns `None`.
#[derive(Debug)]
pub struct SampleGenerator {
    records: Vec<Record>,
    batch_size: usize,
    correction: f64,
    loader: ImageLoader,
    rng: StdRng,
    offset: usize,
    cycle: usize,
}

impl SampleGenerator {
    pub fn num_records(&self) -> usize {
        self.records.len()
    }

    /// The number of completed passes over the records.
    pub fn cycle(&self) -> usize {
        self.cycle
    }

    /// The number of steps per pass, `ceil(records * 4 / batch_size)`.
    pub fn steps_per_cycle(&self) -> usize {
        let num_samples = self.records.len() * AUGMENTATION_FACTOR;
        (num_samples + self.batch_size - 1) / self.batch_size
    }

    /// Derives the augmented samples of one record.
    pub fn augment(&self, record: &Record) -> Result<[Sample; AUGMENTATION_FACTOR]> {
        let Record {
            ref center,
            ref left,
            ref right,
            steering,
        } = *record;

        let center_image = self.loader.load(center)?;
        let flipped_image = flip_horizontal(&center_image);
        let left_image = self.loader.load(left)?;
        let right_image = self.loader.load(right)?;

        Ok([
            Sample {
                kind: SampleKind::Center,
                image: center_image,
                steering,
            },
            Sample {
                kind: SampleKind::Flipped,
                image: flipped_image,
                steering: -steering,
            },
            Sample {
                kind: SampleKind::Left,
                image: left_image,
                steering: steering + self.correction,
            },
            Sample {
                kind: SampleKind::Right,
                image: right_image,
                steering: steering - self.correction,
            },
        ])
    }

    fn next_batch(&mut self) -> Result<Batch> {
        let num_records = self.records.len();
        if num_records == 0 {
            return Ok(Batch::empty());
        }

        if self.offset == 0 {
            debug!("shuffle {} records for cycle {}", num_records, self.cycle);
            self.records.shuffle(&mut self.rng);
        }

        let begin = self.offset;
        let end = (begin + self.batch_size).min(num_records);

        let mut samples = Vec::with_capacity((end - begin) * AUGMENTATION_FACTOR);
        for record in &self.records[begin..end] {
            samples.extend(self.augment(record)?);
        }
        samples.shuffle(&mut self.rng);

        if end == num_records {
            self.offset = 0;
            self.cycle += 1;
        } else {
            self.offset = end;
        }

        Batch::from_samples(samples)
    }
}

impl Iterator for SampleGenerator {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_batch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_per_cycle_rounds_up() {
        let records = (0..10)
            .map(|index| Record {
                center: format!("c{}.jpg", index).into(),
                left: format!("l{}.jpg", index).into(),
                right: format!("r{}.jpg", index).into(),
                steering: 0.0,
            })
            .collect_vec();

        let generator = SampleGeneratorInit {
            batch_size: NonZeroUsize::new(16).unwrap(),
            ..Default::default()
        }
        .build(records)
        .unwrap();

        assert_eq!(generator.num_records(), 10);
        assert_eq!(generator.steps_per_cycle(), 3);
    }

    #[test]
    fn empty_generator_yields_empty_batches() {
        let mut generator = SampleGeneratorInit::default().build(vec![]).unwrap();
        assert_eq!(generator.steps_per_cycle(), 0);

        for _ in 0..3 {
            let batch = generator.next().unwrap().unwrap();
            assert!(batch.is_empty());
            assert_eq!(batch.images.size()[0], 0);
            assert_eq!(batch.targets.size(), vec![0, 1]);
        }
    }

    #[test]
    fn unreadable_image_fails_the_batch() {
        let records = vec![Record {
            center: "/nonexistent/center.jpg".into(),
            left: "/nonexistent/left.jpg".into(),
            right: "/nonexistent/right.jpg".into(),
            steering: 0.1,
        }];
        let mut generator = SampleGeneratorInit::default().build(records).unwrap();
        let err = generator.next().unwrap().unwrap_err();
        assert!(format!("{:#}", err).contains("center.jpg"));
    }
}
