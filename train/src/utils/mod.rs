//! Misc utilities.

mod rate_counter;
mod run_dir;

pub use rate_counter::*;
pub use run_dir::*;
