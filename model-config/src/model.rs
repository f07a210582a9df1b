use crate::{
    common::*,
    layer::{Layer, LayerEx},
};

/// A sequential stack of layers and the per-sample input shape it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Model {
    /// Input image shape in `[height, width, channels]` order.
    pub input_shape: [usize; 3],
    pub layers: Vec<Layer>,
}

impl Model {
    /// Loads a model description from a JSON5 file and checks its shapes.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model file '{}'", path.display()))?;
        let model: Self = json5::from_str(&text)
            .with_context(|| format!("failed to parse model file '{}'", path.display()))?;
        model.output_shapes()?;
        Ok(model)
    }

    /// Saves the model description as pretty JSON, which JSON5 readers accept as well.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Computes the per-sample output shape of every layer.
    pub fn output_shapes(&self) -> Result<Vec<Vec<usize>>> {
        ensure!(!self.layers.is_empty(), "the model has no layers");

        let mut shapes = Vec::with_capacity(self.layers.len());
        let mut shape = self.input_shape.to_vec();

        for (index, layer) in self.layers.iter().enumerate() {
            shape = layer.output_shape(&shape).ok_or_else(|| {
                format_err!(
                    "layer {} ({}) cannot accept input shape {:?}",
                    index,
                    layer.name.as_deref().unwrap_or(layer.kind.as_ref()),
                    shape
                )
            })?;
            shapes.push(shape.clone());
        }

        Ok(shapes)
    }

    /// Computes the per-sample output shape of the last layer.
    pub fn output_shape(&self) -> Result<Vec<usize>> {
        let shapes = self.output_shapes()?;
        Ok(shapes.into_iter().last().unwrap_or_default())
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let shapes = self.output_shapes().map_err(|_| fmt::Error)?;
        writeln!(f, "input\t{:?}", self.input_shape)?;
        self.layers
            .iter()
            .zip_eq(shapes)
            .try_for_each(|(layer, shape)| {
                let name = layer.name.as_deref().unwrap_or("-");
                writeln!(f, "{}\t{}\t{:?}", name, layer.kind.as_ref(), shape)
            })
    }
}
