use super::TensorActivationExt;
use crate::common::*;
use model_config::{self as config, Activation, LayerKind};

/// A layer instantiated with its trainable parameters.
///
/// Image tensors flow through it in `[batch, channels, height, width]` layout.
#[derive(Debug)]
pub enum Module {
    Normalize {
        divisor: f64,
        offset: f64,
    },
    Crop2D {
        top: i64,
        bottom: i64,
        left: i64,
        right: i64,
    },
    Conv2D {
        conv: nn::Conv2D,
        act: Activation,
    },
    Dropout {
        p: f64,
    },
    Flatten,
    Linear {
        linear: nn::Linear,
        act: Activation,
    },
}

impl Module {
    /// Builds the layer under `path`.
    ///
    /// * `input_shape` - The per-sample input shape in `[height, width, channels]`
    ///   order for images, or `[features]` for flat inputs.
    pub fn new<'a>(
        path: impl Borrow<nn::Path<'a>>,
        kind: &LayerKind,
        input_shape: &[usize],
    ) -> Result<Self> {
        let path = path.borrow();

        let module = match *kind {
            LayerKind::Normalize(config::Normalize { divisor, offset }) => Self::Normalize {
                divisor: divisor.raw(),
                offset: offset.raw(),
            },
            LayerKind::Crop2D(config::Crop2D {
                top,
                bottom,
                left,
                right,
            }) => Self::Crop2D {
                top: top as i64,
                bottom: bottom as i64,
                left: left as i64,
                right: right as i64,
            },
            LayerKind::Conv2D(config::Conv2D { c, k, s, p, act }) => {
                let in_c = match *input_shape {
                    [_h, _w, in_c] => in_c,
                    _ => bail!("Conv2D expects an image input, but get shape {:?}", input_shape),
                };
                let conv = nn::conv2d(
                    path,
                    in_c as i64,
                    c as i64,
                    k as i64,
                    nn::ConvConfig {
                        stride: s as i64,
                        padding: p as i64,
                        ..Default::default()
                    },
                );
                Self::Conv2D { conv, act }
            }
            LayerKind::Dropout(config::Dropout { p }) => Self::Dropout { p: p.raw() },
            LayerKind::Flatten => Self::Flatten,
            LayerKind::Linear(config::Linear { out, act }) => {
                let in_c = match *input_shape {
                    [in_c] => in_c,
                    _ => bail!("Linear expects a flat input, but get shape {:?}", input_shape),
                };
                let linear = nn::linear(path, in_c as i64, out as i64, Default::default());
                Self::Linear { linear, act }
            }
        };

        Ok(module)
    }

    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        let ys = match *self {
            Self::Normalize { divisor, offset } => xs / divisor - offset,
            Self::Crop2D {
                top,
                bottom,
                left,
                right,
            } => {
                let (_b, _c, in_h, in_w) = xs.size4()?;
                let out_h = in_h - top - bottom;
                let out_w = in_w - left - right;
                ensure!(
                    out_h > 0 && out_w > 0,
                    "cannot crop {:?} from an image of size {:?}",
                    [top, bottom, left, right],
                    (in_h, in_w)
                );
                xs.narrow(2, top, out_h).narrow(3, left, out_w)
            }
            Self::Conv2D { ref conv, act } => xs.apply(conv).activation(act),
            Self::Dropout { p } => xs.dropout(p, train),
            Self::Flatten => xs.flatten(1, -1),
            Self::Linear { ref linear, act } => xs.apply(linear).activation(act),
        };
        Ok(ys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_removes_bands() {
        let vs = nn::VarStore::new(Device::Cpu);
        let crop = Module::new(
            &vs.root() / "crop",
            &LayerKind::Crop2D(config::Crop2D {
                top: 2,
                bottom: 1,
                left: 0,
                right: 0,
            }),
            &[6, 4, 1],
        )
        .unwrap();

        let xs = Tensor::arange(24, FLOAT_CPU).view([1, 1, 6, 4]);
        let ys = crop.forward_t(&xs, false).unwrap();
        assert_eq!(ys.size(), vec![1, 1, 3, 4]);
        assert!(ys.equal(&xs.narrow(2, 2, 3)));
    }

    #[test]
    fn normalize_applies_divisor_then_offset() {
        let vs = nn::VarStore::new(Device::Cpu);
        let kind = LayerKind::Normalize(config::Normalization::ZeroCentered.to_layer());
        let normalize = Module::new(&vs.root() / "normalize", &kind, &[1, 1, 1]).unwrap();

        let xs = Tensor::of_slice(&[0f32, 127.5, 255.0]);
        let ys = normalize.forward_t(&xs, false).unwrap();
        for (index, expect) in [-0.5, 0.0, 0.5].into_iter().enumerate() {
            approx::assert_abs_diff_eq!(ys.double_value(&[index as i64]), expect, epsilon = 1e-6);
        }
    }

    #[test]
    fn dropout_is_identity_in_evaluation() {
        let vs = nn::VarStore::new(Device::Cpu);
        let kind = LayerKind::Dropout(config::Dropout { p: r64(0.5) });
        let dropout = Module::new(&vs.root() / "dropout", &kind, &[8]).unwrap();

        let xs = Tensor::ones(&[4, 8], FLOAT_CPU);
        assert!(dropout.forward_t(&xs, false).unwrap().equal(&xs));
    }

    #[test]
    fn linear_rejects_image_input() {
        let vs = nn::VarStore::new(Device::Cpu);
        let kind = LayerKind::Linear(config::Linear {
            out: 10,
            act: Activation::Linear,
        });
        assert!(Module::new(&vs.root() / "fc", &kind, &[2, 2, 3]).is_err());
    }
}
