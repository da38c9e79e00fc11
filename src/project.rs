use std::path::{Path, PathBuf};
use anyhow::Result;
use crate::global::settings::Settings;

/// A project root together with the settings that locate its files.
///
/// All lockfile, descriptor and module paths are resolved here, so library
/// code never depends on the process working directory.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub settings: Settings,
}

impl Project {
    pub fn new<P: Into<PathBuf>>(root: P, settings: Settings) -> Self {
        Project { root: root.into(), settings }
    }

    /// A project rooted at the current working directory.
    pub fn current(settings: Settings) -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?, settings))
    }

    /// Returns the path to the lockfile.
    pub fn lock_file(&self) -> PathBuf {
        self.root.join(&self.settings.lock_file)
    }

    /// Returns the path to this project's own module descriptor.
    pub fn descriptor_file(&self) -> PathBuf {
        self.root.join(&self.settings.descriptor_file)
    }

    /// Returns the directory installed modules live in.
    pub fn module_dir(&self) -> PathBuf {
        self.root.join(&self.settings.module_dir)
    }

    /// Returns the install directory of one module.
    pub fn module_path(&self, name: &str) -> PathBuf {
        self.module_dir().join(name)
    }

    /// Returns the descriptor path inside an arbitrary module checkout.
    pub fn descriptor_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.settings.descriptor_file)
    }

    /// The project's display name: descriptor name, else the directory name.
    pub fn display_name(&self) -> String {
        crate::descriptor::ModuleDescriptor::load(self.descriptor_file())
            .ok()
            .map(|descriptor| descriptor.name)
            .filter(|name| !name.is_empty())
            .or_else(|| {
                self.root
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
            })
            .unwrap_or_else(|| String::from("current-module"))
    }
}
