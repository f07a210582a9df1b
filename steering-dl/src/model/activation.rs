use crate::common::*;
use model_config::Activation;

pub trait TensorActivationExt {
    fn activation(&self, act: Activation) -> Tensor;
}

impl TensorActivationExt for Tensor {
    fn activation(&self, act: Activation) -> Tensor {
        use Activation::*;

        match act {
            Linear => self.shallow_clone(),
            Relu => self.relu(),
            Elu => self.elu(),
            Tanh => self.tanh(),
            Logistic => self.sigmoid(),
        }
    }
}
