//! # Ace Core Library
//!
//! This crate contains the core logic of `ace` (Acid Code Exchange), a small
//! module manager for the Acid language. Modules are git repositories that
//! carry a `module.acidcfg` descriptor; installing one clones it into `pkg/`
//! and records the resolved commit, branch and tags in `acid.lock`.
//!
//! This library is built for the `ace` CLI, but you can also reuse it as a backend in other tools.
//!
//! ## Modules Overview
//! - [`lock`] – The `acid.lock` format: parsing, writing and editing module records
//! - [`descriptor`] – The `module.acidcfg` module descriptor
//! - [`text`] – The substring primitive both formats are read with
//! - [`installer`] – Installing, restoring, upgrading and removing modules
//! - [`git`] – Running the system `git`
//! - [`graph`] – Dependency tree rendering
//! - [`project`] – Resolving a project's lockfile and module paths
//! - [`global`] – User settings and platform directories
//! - [`util`] – Shared helpers (timestamps, names, atomic writes)
//! - [`error`] – Error kinds

pub mod descriptor;
pub mod error;
pub mod git;
pub mod global;
pub mod graph;
pub mod installer;
pub mod lock;
pub mod project;
pub mod text;
pub mod util;

pub use descriptor::*;
pub use error::AceError;
pub use installer::*;
pub use lock::*;
pub use project::Project;
pub use global::settings::Settings;
