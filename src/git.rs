//! Thin wrappers around the system `git` binary.
//!
//! Every call runs with an explicit working directory; nothing here changes
//! the process's current directory. Queries that merely describe a checkout
//! (`head_commit`, `tags_at_head`, `current_branch`) degrade to empty values
//! instead of failing, since the lockfile tolerates unknown fields.
//!
//! Repository URLs and revisions come from the command line and from
//! lockfiles checked into other people's projects. They are always passed
//! after `--end-of-options`, and values starting with `-` are refused.

use std::path::Path;
use std::process::Command;
use anyhow::Result;
use tracing::debug;
use crate::error::AceError;

/// Fails with [`AceError::GitNotInstalled`] if `git` is not on `PATH`.
pub fn ensure_installed() -> Result<()> {
    which::which("git").map_err(|_| AceError::GitNotInstalled)?;
    Ok(())
}

/// Fails with [`AceError::OptionLikeArgument`] if `value` starts with `-`.
pub fn ensure_not_option(kind: &'static str, value: &str) -> Result<()> {
    if value.trim_start().starts_with('-') {
        return Err(AceError::OptionLikeArgument { kind, value: value.to_string() }.into());
    }
    Ok(())
}

fn run(args: &[&str], dir: Option<&Path>) -> Result<String> {
    let mut cmd = Command::new("git");
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    debug!(?args, dir = ?dir, "running git");
    let output = cmd.output().map_err(|e| AceError::Git {
        operation: args.first().copied().unwrap_or_default().to_string(),
        stderr: e.to_string(),
    })?;
    if !output.status.success() {
        return Err(AceError::Git {
            operation: args.first().copied().unwrap_or_default().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Clones `url` into `dest`. `shallow` fetches only the latest commit.
pub fn clone_repo(url: &str, dest: &Path, shallow: bool) -> Result<()> {
    ensure_not_option("repository", url)?;
    let dest = dest.to_string_lossy().into_owned();
    let mut args = vec!["clone", "--quiet"];
    if shallow {
        args.extend(["--depth", "1"]);
    }
    args.extend(["--end-of-options", url, dest.as_str()]);
    run(&args, None).map(|_| ())
}

/// Checks out a tag, branch or commit in the repository at `dir`.
pub fn checkout(dir: &Path, rev: &str) -> Result<()> {
    ensure_not_option("revision", rev)?;
    run(&["checkout", "--quiet", "--end-of-options", rev], Some(dir)).map(|_| ())
}

/// Full hash of `HEAD`, or an empty string if it can't be read.
pub fn head_commit(dir: &Path) -> String {
    run(&["rev-parse", "HEAD"], Some(dir)).unwrap_or_default()
}

/// Tags pointing at `HEAD`, in git's order.
pub fn tags_at_head(dir: &Path) -> Vec<String> {
    run(&["tag", "--points-at", "HEAD"], Some(dir))
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Current branch name; empty when detached or on error.
pub fn current_branch(dir: &Path) -> String {
    run(&["branch", "--show-current"], Some(dir)).unwrap_or_default()
}

/// Commit hash the remote's `HEAD` points at, if it can be queried.
pub fn remote_head(url: &str) -> Option<String> {
    ensure_not_option("repository", url).ok()?;
    let output = run(&["ls-remote", "--end-of-options", url, "HEAD"], None).ok()?;
    output
        .split('\t')
        .next()
        .map(str::trim)
        .filter(|hash| !hash.is_empty())
        .map(String::from)
}

/// Revision state of a checkout, as recorded in the lockfile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub commit_hash: String,
    pub branch: String,
    pub tags: Vec<String>,
}

impl Snapshot {
    pub fn capture(dir: &Path) -> Self {
        Snapshot {
            commit_hash: head_commit(dir),
            branch: current_branch(dir),
            tags: tags_at_head(dir),
        }
    }
}
