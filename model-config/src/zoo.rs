use crate::{
    activation::Activation,
    common::*,
    layer::{Conv2D, Crop2D, Dropout, Layer, LayerKind, Linear, Normalization},
    model::Model,
};

/// Input shape of simulator camera frames.
pub const CAMERA_SHAPE: [usize; 3] = [160, 320, 3];

/// Drop probability used by [behavioral_cloning].
pub const DEFAULT_DROPOUT: f64 = 0.5;

/// The steering regression network for behavioral cloning.
///
/// Frames are rescaled, stripped of the sky and the hood, passed through five
/// ELU convolutions and reduced to one unbounded steering value.
pub fn behavioral_cloning(normalization: Normalization, dropout: R64) -> Model {
    let conv = |name: &str, c: usize, k: usize, s: usize| {
        Layer::with_name(
            name,
            Conv2D {
                c,
                k,
                s,
                p: 0,
                act: Activation::Elu,
            },
        )
    };
    let linear = |name: &str, out: usize| {
        Layer::with_name(
            name,
            Linear {
                out,
                act: Activation::Linear,
            },
        )
    };
    let dropout = || Layer::new(Dropout { p: dropout });

    Model {
        input_shape: CAMERA_SHAPE,
        layers: vec![
            Layer::with_name("normalize", normalization.to_layer()),
            Layer::with_name(
                "crop",
                Crop2D {
                    top: 60,
                    bottom: 25,
                    left: 0,
                    right: 0,
                },
            ),
            // stride-2 feature extractor
            conv("conv1", 24, 5, 2),
            dropout(),
            conv("conv2", 36, 5, 2),
            dropout(),
            conv("conv3", 48, 5, 2),
            dropout(),
            // resolution-preserving feature extractor
            conv("conv4", 64, 3, 1),
            dropout(),
            conv("conv5", 64, 3, 1),
            dropout(),
            // regression head
            Layer::with_name("flatten", LayerKind::Flatten),
            linear("fc1", 100),
            dropout(),
            linear("fc2", 50),
            dropout(),
            linear("fc3", 10),
            linear("output", 1),
        ],
    }
}
