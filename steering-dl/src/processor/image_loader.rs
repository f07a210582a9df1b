//! Camera frame decoding.

use crate::common::*;

/// Decodes camera frames into `[height, width, 3]` RGB tensors.
#[derive(Debug, Clone, Default)]
pub struct ImageLoader {
    image_size: Option<[i64; 2]>,
}

impl ImageLoader {
    /// Build a new image loader.
    ///
    /// * `image_size` - If set, the expected `[height, width]` of every frame.
    pub fn new(image_size: impl Into<Option<[usize; 2]>>) -> Self {
        Self {
            image_size: image_size
                .into()
                .map(|[height, width]| [height as i64, width as i64]),
        }
    }

    /// Load an image file as a `Kind::Uint8` tensor in `[height, width, 3]` layout.
    ///
    /// The decoder already produces RGB channel order.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Tensor> {
        let path = path.as_ref();

        tch::no_grad(|| {
            let image = vision::image::load(path)
                .with_context(|| format!("failed to load image file '{}'", path.display()))?;
            let (channels, height, width) = image.size3()?;

            ensure!(
                channels == 3,
                "expect 3 channels, but get {} in image file '{}'",
                channels,
                path.display()
            );
            if let Some([expect_h, expect_w]) = self.image_size {
                ensure!(
                    (height, width) == (expect_h, expect_w),
                    "image size does not match, expect {:?}, but get {:?} in image file '{}'",
                    (expect_h, expect_w),
                    (height, width),
                    path.display()
                );
            }

            Ok(image.permute(&[1, 2, 0]).contiguous())
        })
    }
}

/// Mirrors an `[height, width, channels]` image left to right.
pub fn flip_horizontal(image: &Tensor) -> Tensor {
    image.flip(&[1])
}
