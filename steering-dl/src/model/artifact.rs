use super::SteeringModel;
use crate::common::*;
use std::io::Write as _;

/// A trained network stored in one file: its architecture and every learned weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub architecture: model_config::Model,
    pub weights: IndexMap<String, Weight>,
}

/// A named parameter tensor flattened in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub shape: Vec<i64>,
    pub data: Vec<f32>,
}

impl Weight {
    pub fn from_tensor(tensor: &Tensor) -> Self {
        let tensor = tensor
            .to_device(Device::Cpu)
            .to_kind(Kind::Float)
            .contiguous();
        let numel = tensor.numel();
        let mut data = vec![0f32; numel];
        tensor.copy_data(&mut data, numel);

        Self {
            shape: tensor.size(),
            data,
        }
    }

    pub fn to_tensor(&self) -> Result<Tensor> {
        let numel: i64 = self.shape.iter().product();
        ensure!(
            numel as usize == self.data.len(),
            "weight shape {:?} does not match {} values",
            self.shape,
            self.data.len()
        );
        Ok(Tensor::of_slice(&self.data).reshape(&self.shape))
    }
}

impl ModelArtifact {
    /// Captures the architecture and the current variable values.
    pub fn new(vs: &nn::VarStore, model: &SteeringModel) -> Self {
        let weights: IndexMap<_, _> = vs
            .variables()
            .into_iter()
            .sorted_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs))
            .map(|(name, tensor)| (name, Weight::from_tensor(&tensor)))
            .collect();

        Self {
            architecture: model.config().clone(),
            weights,
        }
    }

    /// Writes the artifact as JSON, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(
            File::create(path)
                .with_context(|| format!("failed to create model file '{}'", path.display()))?,
        );
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(
            File::open(path)
                .with_context(|| format!("failed to open model file '{}'", path.display()))?,
        );
        let artifact: Self = serde_json::from_reader(reader)
            .with_context(|| format!("failed to parse model file '{}'", path.display()))?;
        Ok(artifact)
    }

    /// Rebuilds the network in `vs` and restores its weights.
    pub fn build(&self, vs: &mut nn::VarStore) -> Result<SteeringModel> {
        let model = SteeringModel::new(&vs.root(), &self.architecture)?;
        let mut variables = vs.variables();

        ensure!(
            variables.len() == self.weights.len(),
            "the model has {} variables, but the artifact has {} weights",
            variables.len(),
            self.weights.len()
        );

        tch::no_grad(|| {
            self.weights.iter().try_for_each(|(name, weight)| {
                let variable = variables
                    .get_mut(name)
                    .ok_or_else(|| format_err!("the model has no variable named '{}'", name))?;
                ensure!(
                    variable.size() == weight.shape,
                    "variable '{}' has shape {:?}, but the artifact has {:?}",
                    name,
                    variable.size(),
                    weight.shape
                );
                let value = weight.to_tensor()?.to_device(variable.device());
                variable.copy_(&value);
                Fallible::Ok(())
            })
        })?;

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_config::{behavioral_cloning, Normalization};
    use tempfile::TempDir;

    #[test]
    fn saved_artifact_restores_predictions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        let config = behavioral_cloning(Normalization::Literal, r64(0.5));

        let vs = nn::VarStore::new(Device::Cpu);
        let model = SteeringModel::new(&vs.root(), &config).unwrap();
        let artifact = ModelArtifact::new(&vs, &model);
        artifact.save(&path).unwrap();

        let loaded = ModelArtifact::load(&path).unwrap();
        assert_eq!(loaded, artifact);

        let mut restored_vs = nn::VarStore::new(Device::Cpu);
        let restored = loaded.build(&mut restored_vs).unwrap();

        let input = Tensor::rand(&[2, 160, 320, 3], FLOAT_CPU) * 255.0;
        let expect = tch::no_grad(|| model.forward_t(&input, false)).unwrap();
        let output = tch::no_grad(|| restored.forward_t(&input, false)).unwrap();
        assert!(output.equal(&expect));
    }

    #[test]
    fn saving_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "stale").unwrap();

        let config = behavioral_cloning(Normalization::Literal, r64(0.5));
        let vs = nn::VarStore::new(Device::Cpu);
        let model = SteeringModel::new(&vs.root(), &config).unwrap();
        ModelArtifact::new(&vs, &model).save(&path).unwrap();

        assert!(ModelArtifact::load(&path).is_ok());
    }

    #[test]
    fn mismatched_weights_are_rejected() {
        let config = behavioral_cloning(Normalization::Literal, r64(0.5));
        let vs = nn::VarStore::new(Device::Cpu);
        let model = SteeringModel::new(&vs.root(), &config).unwrap();

        let mut artifact = ModelArtifact::new(&vs, &model);
        artifact.weights["output.weight"].shape = vec![10, 1];

        let mut other_vs = nn::VarStore::new(Device::Cpu);
        assert!(artifact.build(&mut other_vs).is_err());
    }
}
