use crate::{activation::Activation, common::*};

pub trait LayerEx {
    /// Computes the per-sample output shape from the per-sample input shape.
    ///
    /// Image shapes are in `[height, width, channels]` order. It returns `None`
    /// if the layer cannot accept the input shape.
    fn output_shape(&self, input_shape: &[usize]) -> Option<Vec<usize>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub name: Option<String>,
    pub kind: LayerKind,
}

impl Layer {
    pub fn new(kind: impl Into<LayerKind>) -> Self {
        Self {
            name: None,
            kind: kind.into(),
        }
    }

    pub fn with_name(name: impl Into<String>, kind: impl Into<LayerKind>) -> Self {
        Self {
            name: Some(name.into()),
            kind: kind.into(),
        }
    }
}

impl LayerEx for Layer {
    fn output_shape(&self, input_shape: &[usize]) -> Option<Vec<usize>> {
        self.kind.output_shape(input_shape)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, AsRefStr, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayerKind {
    Normalize(Normalize),
    Crop2D(Crop2D),
    Conv2D(Conv2D),
    Dropout(Dropout),
    Flatten,
    Linear(Linear),
}

impl LayerEx for LayerKind {
    fn output_shape(&self, input_shape: &[usize]) -> Option<Vec<usize>> {
        match self {
            Self::Normalize(layer) => layer.output_shape(input_shape),
            Self::Crop2D(layer) => layer.output_shape(input_shape),
            Self::Conv2D(layer) => layer.output_shape(input_shape),
            Self::Dropout(layer) => layer.output_shape(input_shape),
            Self::Flatten => {
                if input_shape.is_empty() {
                    return None;
                }
                Some(vec![input_shape.iter().product()])
            }
            Self::Linear(layer) => layer.output_shape(input_shape),
        }
    }
}

impl From<Normalize> for LayerKind {
    fn from(v: Normalize) -> Self {
        Self::Normalize(v)
    }
}

impl From<Crop2D> for LayerKind {
    fn from(v: Crop2D) -> Self {
        Self::Crop2D(v)
    }
}

impl From<Conv2D> for LayerKind {
    fn from(v: Conv2D) -> Self {
        Self::Conv2D(v)
    }
}

impl From<Dropout> for LayerKind {
    fn from(v: Dropout) -> Self {
        Self::Dropout(v)
    }
}

impl From<Linear> for LayerKind {
    fn from(v: Linear) -> Self {
        Self::Linear(v)
    }
}

/// Computes `input / divisor - offset` element-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Normalize {
    pub divisor: R64,
    #[serde(default = "zero_r64")]
    pub offset: R64,
}

impl LayerEx for Normalize {
    fn output_shape(&self, input_shape: &[usize]) -> Option<Vec<usize>> {
        (self.divisor != 0.0).then(|| input_shape.to_vec())
    }
}

/// The pixel rescaling flavor applied at the network input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// `x / (255.0 - 0.5)`.
    Literal,
    /// `x / 255.0 - 0.5`.
    ZeroCentered,
}

impl Default for Normalization {
    fn default() -> Self {
        Self::Literal
    }
}

impl Normalization {
    pub fn to_layer(self) -> Normalize {
        match self {
            Self::Literal => Normalize {
                divisor: r64(255.0 - 0.5),
                offset: r64(0.0),
            },
            Self::ZeroCentered => Normalize {
                divisor: r64(255.0),
                offset: r64(0.5),
            },
        }
    }
}

/// Removes fixed bands from the image borders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crop2D {
    #[serde(default)]
    pub top: usize,
    #[serde(default)]
    pub bottom: usize,
    #[serde(default)]
    pub left: usize,
    #[serde(default)]
    pub right: usize,
}

impl LayerEx for Crop2D {
    fn output_shape(&self, input_shape: &[usize]) -> Option<Vec<usize>> {
        let Self {
            top,
            bottom,
            left,
            right,
        } = *self;

        let [in_h, in_w, in_c] = match *input_shape {
            [h, w, c] => [h, w, c],
            _ => return None,
        };

        let out_h = in_h.checked_sub(top + bottom).filter(|&h| h > 0)?;
        let out_w = in_w.checked_sub(left + right).filter(|&w| w > 0)?;
        Some(vec![out_h, out_w, in_c])
    }
}

/// 2D convolution without implicit padding unless `p` is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conv2D {
    pub c: usize,
    pub k: usize,
    #[serde(default = "default_stride")]
    pub s: usize,
    #[serde(default)]
    pub p: usize,
    #[serde(default)]
    pub act: Activation,
}

impl Conv2D {
    pub fn new(c: usize, k: usize) -> Self {
        Self {
            c,
            k,
            s: default_stride(),
            p: 0,
            act: Activation::Linear,
        }
    }
}

impl LayerEx for Conv2D {
    fn output_shape(&self, input_shape: &[usize]) -> Option<Vec<usize>> {
        let Self {
            c: out_c, k, s, p, ..
        } = *self;

        if out_c == 0 || k == 0 || s == 0 {
            return None;
        }

        let [in_h, in_w] = match *input_shape {
            [h, w, _c] => [h, w],
            _ => return None,
        };

        let out_h = (in_h + 2 * p).checked_sub(k)? / s + 1;
        let out_w = (in_w + 2 * p).checked_sub(k)? / s + 1;
        Some(vec![out_h, out_w, out_c])
    }
}

/// Zeroes elements with probability `p` during training.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dropout {
    pub p: R64,
}

impl LayerEx for Dropout {
    fn output_shape(&self, input_shape: &[usize]) -> Option<Vec<usize>> {
        (0.0..1.0)
            .contains(&self.p.raw())
            .then(|| input_shape.to_vec())
    }
}

/// Fully connected layer over a flat input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Linear {
    pub out: usize,
    #[serde(default)]
    pub act: Activation,
}

impl LayerEx for Linear {
    fn output_shape(&self, input_shape: &[usize]) -> Option<Vec<usize>> {
        match *input_shape {
            [in_c] if in_c > 0 && self.out > 0 => Some(vec![self.out]),
            _ => None,
        }
    }
}

fn default_stride() -> usize {
    1
}

fn zero_r64() -> R64 {
    r64(0.0)
}
