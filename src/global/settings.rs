use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;
use crate::global::utils::get_global_settings_file;
use crate::util::read_optional;

/// User settings read from `config.toml`.
///
/// Every key is optional; missing keys take the defaults below.
///
/// ```toml
/// lock_file = "acid.lock"
/// descriptor_file = "module.acidcfg"
/// module_dir = "pkg"
/// shallow_clone = true
/// ```
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Lockfile path, relative to the project root unless absolute.
    pub lock_file: PathBuf,
    /// File name of the module descriptor, in projects and in cloned modules.
    pub descriptor_file: String,
    /// Directory modules are installed into, relative to the project root.
    pub module_dir: PathBuf,
    /// Clone with `--depth 1` when no revision was requested.
    pub shallow_clone: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lock_file: PathBuf::from("acid.lock"),
            descriptor_file: String::from("module.acidcfg"),
            module_dir: PathBuf::from("pkg"),
            shallow_clone: true,
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or from the platform config directory when
    /// `path` is `None`. A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns an error if the file exists but can't be read or isn't valid TOML.
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match get_global_settings_file() {
                Ok(path) => path,
                Err(e) => {
                    debug!("no platform config directory: {e}");
                    return Ok(Settings::default());
                }
            },
        };
        match read_optional(&path)? {
            Some(content) => {
                debug!(path = %path.display(), "loaded settings");
                Self::from_toml(&content)
                    .with_context(|| format!("Invalid settings file {}", path.display()))
            }
            None => Ok(Settings::default()),
        }
    }

    pub fn from_toml(content: &str) -> Result<Settings> {
        toml::from_str(content).map_err(|e| e.into())
    }
}
