use std::fmt;
use std::path::Path;
use anyhow::{bail, Result};
use serde::Serialize;
use crate::error::AceError;
use crate::text::quoted_field;
use crate::util::{atomic_write, is_valid_version, normalize_module_name, read_optional};

/// Default version written by `ace init`.
pub const DEFAULT_MODULE_VERSION: &str = "0.1.0";

/// Represents the contents of a `module.acidcfg` file.
///
/// Every installable module carries one at its repository root; the `name`
/// decides the directory the module is installed into.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Lowercase, space-free module name.
    pub name: String,
    /// Free-text author.
    pub author: String,
    /// Free-text version string.
    pub version: String,
}

impl ModuleDescriptor {
    /// Creates a descriptor for a new module named after `dir_name`.
    ///
    /// The name is lowercased with spaces replaced by `_`. The author is taken
    /// from `$USER`, then `$USERNAME`, falling back to `unknown`. The version
    /// is `0.1.0`.
    pub fn default(dir_name: &str) -> ModuleDescriptor {
        ModuleDescriptor {
            name: normalize_module_name(dir_name),
            author: current_user(),
            version: String::from(DEFAULT_MODULE_VERSION),
        }
    }

    /// Parses descriptor text. Only `name`, `author` and `version` lines are
    /// read; anything else is ignored.
    pub fn parse(content: &str) -> ModuleDescriptor {
        let mut descriptor = ModuleDescriptor {
            name: String::new(),
            author: String::new(),
            version: String::new(),
        };
        for line in content.lines().map(str::trim) {
            if line.contains("\"name\":") {
                descriptor.name = quoted_field(line, "name").to_string();
            } else if line.contains("\"author\":") {
                descriptor.author = quoted_field(line, "author").to_string();
            } else if line.contains("\"version\":") {
                descriptor.version = quoted_field(line, "version").to_string();
            }
        }
        descriptor
    }

    /// Loads a `ModuleDescriptor` from a file path.
    ///
    /// # Errors
    /// Returns [`AceError::DescriptorNotFound`] if the file does not exist,
    /// or the I/O error if it can't be read.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ModuleDescriptor> {
        let path = path.as_ref();
        match read_optional(path)? {
            Some(content) => Ok(Self::parse(&content)),
            None => Err(AceError::DescriptorNotFound(path.to_path_buf()).into()),
        }
    }

    /// Saves the descriptor to the given file path.
    ///
    /// # Errors
    /// Returns an error if the file can't be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        atomic_write(path, &self.to_string())
    }

    /// Replaces the version, which must be valid semver.
    ///
    /// # Errors
    /// Returns an error if `version` is not a valid version.
    pub fn set_version(&mut self, version: &str) -> Result<()> {
        if !is_valid_version(version) {
            bail!("Invalid version: {}", version);
        }
        self.version = version.to_string();
        Ok(())
    }
}

impl fmt::Display for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        writeln!(f, "  \"name\": \"{}\",", self.name)?;
        writeln!(f, "  \"author\": \"{}\",", self.author)?;
        writeln!(f, "  \"version\": \"{}\"", self.version)?;
        writeln!(f, "}}")
    }
}

fn current_user() -> String {
    ["USER", "USERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| String::from("unknown"))
}
