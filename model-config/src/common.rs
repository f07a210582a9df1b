pub use anyhow::{bail, ensure, format_err, Context, Error, Result};
pub use itertools::Itertools;
pub use noisy_float::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use std::{
    fmt::{self, Display, Formatter},
    path::{Path, PathBuf},
};
pub use strum::AsRefStr;
