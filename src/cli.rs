use std::path::PathBuf;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "Version examples:
    ace install https://github.com/user/repo@v1.2.3  # Install specific tag
    ace install https://github.com/user/repo@main    # Install specific branch
    ace install https://github.com/user/repo@abc123  # Install specific commit

Installing a module that is already installed updates it to the given version or HEAD.")]
pub struct CLI {
    #[command(subcommand)]
    pub(crate) command: AceCommand,
    /// Settings file to use instead of the platform default
    #[clap(long, global = true, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
    /// Lockfile path (default: `acid.lock`)
    #[clap(long, global = true, value_name = "PATH")]
    pub(crate) lock_file: Option<PathBuf>,
    /// Directory modules are installed into (default: `pkg`)
    #[clap(long, global = true, value_name = "PATH")]
    pub(crate) module_dir: Option<PathBuf>,
    /// Print debug logs to stderr
    #[clap(short, long, global = true)]
    pub(crate) verbose: bool,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum AceCommand {
    /// Installs a module from a git repository and records it in the lockfile
    Install {
        /// Repository URL, optionally suffixed with `@<tag|branch|commit>`
        source: String,
        /// Tag, branch or commit to check out. Overrides an `@` suffix
        #[clap(long, value_name = "REV")]
        rev: Option<String>,
    },
    /// Removes a module directory and its lockfile entry
    Remove {
        name: String,
    },
    /// Restores every module from the lockfile at its locked commit
    Restore,
    /// Upgrades every module to the latest commit of its repository
    Upgrade,
    /// Creates a `module.acidcfg` for the current directory
    Init {
        /// Module name. Defaults to the directory name
        #[clap(long)]
        name: Option<String>,
        /// Author. Defaults to $USER
        #[clap(long)]
        author: Option<String>,
        /// Initial module version (semver). Defaults to 0.1.0
        #[clap(long, value_name = "VERSION")]
        module_version: Option<String>,
    },
    /// Lists installed modules
    List {
        /// Print the lockfile as JSON
        #[clap(long)]
        json: bool,
    },
    /// Shows everything recorded about one module
    Info {
        name: String,
        /// Print as JSON
        #[clap(long)]
        json: bool,
    },
    /// Prints installed modules as a tree under the current project
    Tree,
    /// Prints the version of ace
    Version,
}
