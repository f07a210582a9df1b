//! Data pipeline and network for steering angle regression.

mod common;
pub mod dataset;
pub mod model;
pub mod processor;
