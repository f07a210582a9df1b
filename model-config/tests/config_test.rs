use anyhow::Result;
use model_config::{behavioral_cloning, Model, Normalization};
use noisy_float::prelude::*;
use std::path::{Path, PathBuf};

lazy_static::lazy_static! {
    static ref CONFIG_DIR: PathBuf = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("cfg");
}

#[test]
fn model_config_test() -> Result<()> {
    let model = Model::load(CONFIG_DIR.join("behavioral-cloning.json5"))?;
    assert_eq!(model, behavioral_cloning(Normalization::Literal, r64(0.5)));
    assert_eq!(model.output_shape()?, vec![1]);
    Ok(())
}

#[test]
fn invalid_model_config_test() {
    let result = Model::load(CONFIG_DIR.join("too-deep.json5"));
    assert!(result.is_err());
}

#[test]
fn saved_model_config_can_be_loaded() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("model.json5");
    let model = behavioral_cloning(Normalization::ZeroCentered, r64(0.25));

    model.save(&path)?;
    assert_eq!(Model::load(&path)?, model);
    Ok(())
}
