//! User-level state that lives outside any project.

pub mod settings;
pub mod utils;
