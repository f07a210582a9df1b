use crate::common::*;

pub const FILE_STRFTIME: &str = "%Y-%m-%d-%H-%M-%S.%3f%z";

/// The resolved network description written into each run directory.
pub const MODEL_FILE_NAME: &str = "model.json5";

/// Creates a directory named after the current local time under `logging_dir`.
pub fn create_run_dir(logging_dir: &Path) -> Result<PathBuf> {
    let dir = logging_dir.join(format!("{}", Local::now().format(FILE_STRFTIME)));
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create logging directory '{}'", dir.display()))?;
    Ok(dir)
}

/// Saves `config` as `config.json5` in the run directory.
pub fn save_config<T>(run_dir: &Path, config: &T) -> Result<()>
where
    T: Serialize,
{
    let path = run_dir.join("config.json5");
    let text = serde_json::to_string_pretty(config)?;
    fs::write(&path, text)?;
    Ok(())
}
