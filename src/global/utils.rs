use std::path::PathBuf;
use anyhow::{anyhow, Result};
use directories::ProjectDirs;

/// Name of the user settings file inside the config directory.
pub const SETTINGS_FILE: &str = "config.toml";

pub fn get_global_config_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("org", "acid", "ace")
        .ok_or_else(|| anyhow!("Could not get project directories"))?;
    Ok(proj_dirs.config_dir().to_path_buf())
}

/// Returns `<config dir>/config.toml`. The file may not exist.
pub fn get_global_settings_file() -> Result<PathBuf> {
    Ok(get_global_config_dir()?.join(SETTINGS_FILE))
}
