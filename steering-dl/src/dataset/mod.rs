//! Driving log records and dataset splitting.

mod log_reader;
mod record;
mod split;

pub use log_reader::*;
pub use record::*;
pub use split::*;
