//! Configuration file location.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// File name of the login configuration inside the config directory.
const CONFIG_FILE: &str = "login.json";

/// Resolve the configuration path, preferring an explicit one.
pub fn config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    let dirs =
        ProjectDirs::from("", "", "sesame").context("Could not determine config directory")?;

    Ok(dirs.config_dir().join(CONFIG_FILE))
}
