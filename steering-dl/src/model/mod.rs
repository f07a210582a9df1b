//! The steering regression network on top of tch.

mod activation;
mod artifact;
mod model;
mod module;

pub use activation::*;
pub use artifact::*;
pub use model::*;
pub use module::*;
