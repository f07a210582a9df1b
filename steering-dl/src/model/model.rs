use super::Module;
use crate::common::*;

/// The steering regression network built from a [model_config::Model].
#[derive(Debug)]
pub struct SteeringModel {
    config: model_config::Model,
    modules: Vec<Module>,
}

impl SteeringModel {
    pub fn new<'a>(path: impl Borrow<nn::Path<'a>>, config: &model_config::Model) -> Result<Self> {
        let path = path.borrow();
        let output_shapes = config.output_shapes()?;

        ensure!(
            output_shapes.last().map(|shape| shape.as_slice()) == Some(&[1][..]),
            "the model must output one value per sample, but get shape {:?}",
            output_shapes.last()
        );

        let input_shapes = iter::once(config.input_shape.to_vec()).chain(output_shapes);
        let modules: Vec<_> = config
            .layers
            .iter()
            .enumerate()
            .zip(input_shapes)
            .map(|((index, layer), input_shape)| {
                let name = layer
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("layer_{}", index));
                Module::new(path / name, &layer.kind, &input_shape)
            })
            .try_collect()?;

        Ok(Self {
            config: config.clone(),
            modules,
        })
    }

    pub fn config(&self) -> &model_config::Model {
        &self.config
    }

    /// Predicts steering angles.
    ///
    /// * `input` - Images in `[batch, height, width, 3]` layout with raw 0-255 values.
    ///
    /// It returns a `[batch, 1]` float tensor.
    pub fn forward_t(&self, input: &Tensor, train: bool) -> Result<Tensor> {
        let (_b, in_h, in_w, in_c) = input.size4()?;
        let [expect_h, expect_w, expect_c] = self.config.input_shape;
        ensure!(
            [in_h, in_w, in_c] == [expect_h as i64, expect_w as i64, expect_c as i64],
            "expect input shape [_, {}, {}, {}], but get {:?}",
            expect_h,
            expect_w,
            expect_c,
            input.size()
        );

        let xs = input.to_kind(Kind::Float).permute(&[0, 3, 1, 2]);
        self.modules
            .iter()
            .try_fold(xs, |xs, module| module.forward_t(&xs, train))
    }

    /// Computes the mean squared error between predictions and `targets`.
    pub fn loss(&self, input: &Tensor, targets: &Tensor, train: bool) -> Result<Tensor> {
        let output = self.forward_t(input, train)?;
        ensure!(
            output.size() == targets.size(),
            "target shape {:?} does not match output shape {:?}",
            targets.size(),
            output.size()
        );
        Ok(output.mse_loss(targets, tch::Reduction::Mean))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_config::{behavioral_cloning, Normalization};

    #[test]
    fn camera_batch_yields_one_value_per_sample() {
        let vs = nn::VarStore::new(Device::Cpu);
        let config = behavioral_cloning(Normalization::Literal, r64(0.5));
        let model = SteeringModel::new(&vs.root(), &config).unwrap();

        let input = Tensor::rand(&[2, 160, 320, 3], FLOAT_CPU) * 255.0;
        let output = model.forward_t(&input, true).unwrap();
        assert_eq!(output.size(), vec![2, 1]);

        let output = tch::no_grad(|| model.forward_t(&input, false)).unwrap();
        assert_eq!(output.size(), vec![2, 1]);
    }

    #[test]
    fn wrong_input_shape_is_rejected() {
        let vs = nn::VarStore::new(Device::Cpu);
        let config = behavioral_cloning(Normalization::Literal, r64(0.5));
        let model = SteeringModel::new(&vs.root(), &config).unwrap();

        let input = Tensor::zeros(&[1, 3, 160, 320], FLOAT_CPU);
        assert!(model.forward_t(&input, false).is_err());
    }

    #[test]
    fn loss_is_zero_for_exact_predictions() {
        let vs = nn::VarStore::new(Device::Cpu);
        let config = behavioral_cloning(Normalization::ZeroCentered, r64(0.5));
        let model = SteeringModel::new(&vs.root(), &config).unwrap();

        let input = Tensor::zeros(&[3, 160, 320, 3], FLOAT_CPU);
        let targets = tch::no_grad(|| model.forward_t(&input, false)).unwrap();
        let loss = tch::no_grad(|| model.loss(&input, &targets, false)).unwrap();
        assert_eq!(f64::from(&loss), 0.0);
    }

    #[test]
    fn variables_are_named_after_layers() {
        let vs = nn::VarStore::new(Device::Cpu);
        let config = behavioral_cloning(Normalization::Literal, r64(0.5));
        let _model = SteeringModel::new(&vs.root(), &config).unwrap();

        let names = vs.variables().into_keys().sorted().collect_vec();
        let expect = ["conv1", "conv2", "conv3", "conv4", "conv5", "fc1", "fc2", "fc3", "output"]
            .iter()
            .flat_map(|layer| [format!("{}.bias", layer), format!("{}.weight", layer)])
            .sorted()
            .collect_vec();
        assert_eq!(names, expect);
    }
}
