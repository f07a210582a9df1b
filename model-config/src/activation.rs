use crate::common::*;

/// Element-wise non-linearity applied after a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Linear,
    Relu,
    Elu,
    Tanh,
    Logistic,
}

impl Default for Activation {
    fn default() -> Self {
        Self::Linear
    }
}
