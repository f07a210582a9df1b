pub use anyhow::{bail, ensure, format_err, Context, Error, Result};
pub use indexmap::IndexMap;
pub use itertools::Itertools;
pub use noisy_float::prelude::*;
pub use rand::{prelude::*, rngs::StdRng, seq::SliceRandom};
pub use serde::{Deserialize, Serialize};
pub use std::{
    borrow::Borrow,
    fs::File,
    io::{BufReader, BufWriter},
    iter,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};
pub use tch::{kind::FLOAT_CPU, nn, vision, Device, Kind, Tensor};
pub use tch_tensor_like::TensorLike;
pub use tracing::{debug, info, warn};

pub type Fallible<T> = Result<T, Error>;

unzip_n::unzip_n!(pub 3);
