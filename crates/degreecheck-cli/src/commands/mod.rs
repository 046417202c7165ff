pub mod check;
pub mod init;
pub mod summary;
pub mod validate;

use std::path::PathBuf;

use anyhow::Result;

use degreecheck_core::config::{load_config_from, DegreecheckConfig};
use degreecheck_core::parser::DataDir;

/// Load config and resolve the data directory; `--data` wins over the config.
fn load_data(
    data: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<(DegreecheckConfig, DataDir)> {
    let config = load_config_from(config_path.as_deref())?;
    let root = data.unwrap_or_else(|| config.data_dir.clone());
    anyhow::ensure!(root.is_dir(), "data directory not found: {}", root.display());
    tracing::debug!("using data directory {}", root.display());
    Ok((config, DataDir::new(root)))
}
