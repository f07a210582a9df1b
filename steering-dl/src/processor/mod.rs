//! Image loading and batch generation.

mod image_loader;
mod sample_generator;

pub use image_loader::*;
pub use sample_generator::*;
