//! Declarative description of the steering regression network.
//!
//! A [Model] is a flat list of typed [Layer] descriptors. The descriptors carry
//! no tensors, so they can be stored in configuration files and embedded in
//! trained model artifacts.

mod common;
pub mod activation;
pub mod layer;
pub mod model;
pub mod zoo;

pub use activation::*;
pub use layer::*;
pub use model::*;
pub use zoo::*;
