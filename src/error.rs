use std::path::PathBuf;
use thiserror::Error;

/// Error kinds callers may want to tell apart.
///
/// Functions return `anyhow::Result`; use `err.downcast_ref::<AceError>()`
/// to recover the kind, e.g. to treat a missing lockfile as empty.
#[derive(Debug, Error)]
pub enum AceError {
    #[error("No lockfile found at {}", .0.display())]
    LockfileNotFound(PathBuf),

    #[error("No module descriptor found at {}", .0.display())]
    DescriptorNotFound(PathBuf),

    #[error("{} already exists. Aborting.", .0.display())]
    DescriptorExists(PathBuf),

    #[error("Module '{0}' not found")]
    ModuleNotFound(String),

    #[error("Invalid module name '{0}': expected lowercase letters, digits, '_', '-' or '.'")]
    InvalidModuleName(String),

    #[error("Refusing {kind} '{value}': values starting with '-' would be read as git options")]
    OptionLikeArgument { kind: &'static str, value: String },

    #[error("Git is not installed or not in PATH. Install Git.")]
    GitNotInstalled,

    #[error("git {operation} failed: {stderr}")]
    Git { operation: String, stderr: String },
}

impl AceError {
    /// True if `err` is one of the "file does not exist" kinds.
    pub fn is_not_found(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<AceError>(),
            Some(AceError::LockfileNotFound(_)) | Some(AceError::DescriptorNotFound(_))
        )
    }
}
