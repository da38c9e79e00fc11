use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use colored::Colorize;
use tempfile::TempDir;
use tracing::debug;
use walkdir::WalkDir;
use crate::descriptor::ModuleDescriptor;
use crate::error::AceError;
use crate::git::{self, Snapshot};
use crate::lock::{AceLock, LockEntry};
use crate::project::Project;
use crate::util::{is_valid_module_name, repo_name_from_url, short_hash, split_source};

/// A module that was placed into the module directory.
#[derive(Debug, Clone)]
pub struct InstalledModule {
    pub name: String,
    pub path: PathBuf,
    pub entry: LockEntry,
}

/// Per-module results of `restore` and `upgrade`.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Modules that were restored or upgraded.
    pub done: Vec<String>,
    /// Modules already at the remote head.
    pub unchanged: Vec<String>,
    /// Modules that were skipped, with the reason.
    pub failed: Vec<(String, String)>,
}

/// Installs a module from a git repository and records it in the lockfile.
///
/// `source` is a repository URL, optionally suffixed with `@<rev>`; an
/// explicit `rev` takes precedence over the suffix. Installing a module that
/// is already present replaces it.
///
/// # Errors
/// Fails if git is missing, the clone or checkout fails, the repository has
/// no descriptor, or the descriptor names an invalid module.
pub fn install_module(project: &Project, source: &str, rev: Option<&str>) -> Result<InstalledModule> {
    git::ensure_installed()?;
    let (url, source_rev) = split_source(source);
    let rev = rev.or(source_rev);

    let staging = staging_dir(project)?;
    let clone_dir = clone_dir_for(&staging, url);
    println!("Cloning {}...", url);
    match rev {
        Some(rev) => {
            git::clone_repo(url, &clone_dir, false)?;
            git::checkout(&clone_dir, rev)
                .with_context(|| format!("Could not checkout version '{}'", rev))?;
        }
        None => git::clone_repo(url, &clone_dir, project.settings.shallow_clone)?,
    }

    let descriptor = read_module_descriptor(project, &clone_dir)?;
    let snapshot = Snapshot::capture(&clone_dir);
    if let (Some(rev), Some(short)) = (rev, short_hash(&snapshot.commit_hash)) {
        println!("Checked out version {} (commit: {})", rev, short);
    }

    let path = place_module(project, &clone_dir, &descriptor.name)?;
    println!("Saved module to {}", path.display());

    let entry = LockEntry::captured(
        url,
        snapshot.commit_hash,
        rev.unwrap_or_default(),
        snapshot.branch,
        snapshot.tags,
    );
    let lock_path = project.lock_file();
    let mut lock = AceLock::load_or_default(&lock_path)?;
    lock.upsert(&descriptor.name, entry.clone());
    lock.save(&lock_path)?;

    Ok(InstalledModule { name: descriptor.name, path, entry })
}

/// Re-clones every module in the lockfile at its recorded commit.
///
/// The lockfile itself is left untouched. A module that can't be restored is
/// reported in [`BatchReport::failed`] and the rest continue.
///
/// # Errors
/// Fails if the lockfile does not exist or git is missing.
pub fn restore_modules(project: &Project) -> Result<BatchReport> {
    let lock = AceLock::load(project.lock_file())?;
    git::ensure_installed()?;
    let mut report = BatchReport::default();

    for (name, entry) in lock.iter() {
        println!("Restoring {} from {}", name.bold(), entry.repo);
        if let Some(short) = short_hash(&entry.commit_hash) {
            println!("  Target commit: {}", short);
            if !entry.requested_version.is_empty() {
                println!("  Original version: {}", entry.requested_version);
            }
        }
        match check_locked(name, entry).and_then(|()| restore_module(project, name, entry)) {
            Ok(path) => {
                println!("Restored {} to {}", name, path.display());
                report.done.push(name.clone());
            }
            Err(e) => {
                debug!(module = %name, "restore failed: {e:#}");
                println!("{} skipping {}: {:#}", "Warning:".yellow(), name, e);
                report.failed.push((name.clone(), format!("{e:#}")));
            }
        }
    }
    Ok(report)
}

fn restore_module(project: &Project, name: &str, entry: &LockEntry) -> Result<PathBuf> {
    let staging = staging_dir(project)?;
    let clone_dir = clone_dir_for(&staging, &entry.repo);
    git::clone_repo(&entry.repo, &clone_dir, false)?;
    if !entry.commit_hash.is_empty() {
        if let Err(e) = git::checkout(&clone_dir, &entry.commit_hash) {
            debug!(module = %name, "checkout failed: {e:#}");
            println!(
                "{} Could not checkout commit {} for {}",
                "Warning:".yellow(),
                entry.commit_hash,
                name
            );
        }
    }
    let descriptor = read_module_descriptor(project, &clone_dir)?;
    place_module(project, &clone_dir, &descriptor.name)
}

/// Moves every module whose remote `HEAD` has moved to the new head.
///
/// Upgraded entries lose their requested version and get a fresh snapshot
/// and timestamp; the lockfile is saved after each one.
///
/// # Errors
/// Fails if the lockfile does not exist, git is missing, or the lockfile
/// can't be written.
pub fn upgrade_modules(project: &Project) -> Result<BatchReport> {
    let lock_path = project.lock_file();
    let mut lock = AceLock::load(&lock_path)?;
    let mut report = BatchReport::default();
    if lock.is_empty() {
        println!("No modules to upgrade.");
        return Ok(report);
    }
    git::ensure_installed()?;
    println!("Upgrading all modules to latest versions...");

    let names: Vec<String> = lock.iter().map(|(name, _)| name.clone()).collect();
    for name in names {
        let Some(entry) = lock.get(&name).cloned() else {
            continue;
        };
        println!("Checking {}...", name.bold());
        if let Err(e) = check_locked(&name, &entry) {
            println!("  {} skipping {}: {:#}", "Warning:".yellow(), name, e);
            report.failed.push((name, format!("{e:#}")));
            continue;
        }
        let latest = match git::remote_head(&entry.repo) {
            Some(latest) if latest != entry.commit_hash => latest,
            _ => {
                println!("  {} is already up to date", name);
                report.unchanged.push(name);
                continue;
            }
        };
        if let (Some(from), Some(to)) = (short_hash(&entry.commit_hash), short_hash(&latest)) {
            println!("  Updating from {} to {}", from, to);
        }
        match upgrade_module(project, &name, &entry) {
            Ok(updated) => {
                lock.upsert(&name, updated);
                lock.save(&lock_path)?;
                println!("  {} {}", "Updated".green(), name);
                report.done.push(name);
            }
            Err(e) => {
                debug!(module = %name, "upgrade failed: {e:#}");
                println!("  {} skipping {}: {:#}", "Warning:".yellow(), name, e);
                report.failed.push((name, format!("{e:#}")));
            }
        }
    }
    Ok(report)
}

fn upgrade_module(project: &Project, name: &str, entry: &LockEntry) -> Result<LockEntry> {
    let staging = staging_dir(project)?;
    let clone_dir = clone_dir_for(&staging, &entry.repo);
    git::clone_repo(&entry.repo, &clone_dir, true)?;
    read_module_descriptor(project, &clone_dir)?;
    let path = place_module(project, &clone_dir, name)?;
    let snapshot = Snapshot::capture(&path);
    Ok(LockEntry::captured(
        &entry.repo,
        snapshot.commit_hash,
        "",
        snapshot.branch,
        snapshot.tags,
    ))
}

/// Deletes a module's directory and its lockfile record.
///
/// The module counts as present if either exists. A missing lockfile is
/// fine as long as the directory is there, and is not created.
///
/// # Errors
/// Returns [`AceError::ModuleNotFound`] if neither exists.
pub fn remove_module(project: &Project, name: &str) -> Result<()> {
    let lock_path = project.lock_file();
    let mut lock = match AceLock::load(&lock_path) {
        Ok(lock) => Some(lock),
        Err(e) if AceError::is_not_found(&e) => None,
        Err(e) => return Err(e),
    };
    let locked = lock.as_ref().is_some_and(|lock| lock.contains(name));
    let dir = find_module_dir(project, name);

    if !locked && dir.is_none() {
        return Err(AceError::ModuleNotFound(name.to_string()).into());
    }

    if let Some(dir) = dir {
        std::fs::remove_dir_all(&dir)
            .with_context(|| format!("Error removing directory {}", dir.display()))?;
        println!("Removed module directory {}", dir.display());
    }
    if let Some(lock) = lock.as_mut().filter(|_| locked) {
        lock.remove(name);
        lock.save(&lock_path)?;
        println!("Removed {} from lock file.", name);
    }
    Ok(())
}

/// Scans the module directory for a sub-directory called `name`.
pub fn find_module_dir(project: &Project, name: &str) -> Option<PathBuf> {
    let module_dir = project.module_dir();
    if !module_dir.is_dir() {
        return None;
    }
    WalkDir::new(&module_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.file_type().is_dir() && entry.file_name().to_string_lossy() == name)
        .map(|entry| entry.into_path())
}

/// Checks a lockfile record before its name becomes a path or its
/// repository reaches git.
fn check_locked(name: &str, entry: &LockEntry) -> Result<()> {
    if !is_valid_module_name(name) {
        return Err(AceError::InvalidModuleName(name.to_string()).into());
    }
    git::ensure_not_option("repository", &entry.repo)
}

/// Reads the descriptor of a freshly cloned module and checks its name.
fn read_module_descriptor(project: &Project, clone_dir: &Path) -> Result<ModuleDescriptor> {
    let descriptor = ModuleDescriptor::load(project.descriptor_in(clone_dir))?;
    if !is_valid_module_name(&descriptor.name) {
        return Err(AceError::InvalidModuleName(descriptor.name).into());
    }
    Ok(descriptor)
}

/// Replaces `<module_dir>/<name>` with the checkout at `from`.
fn place_module(project: &Project, from: &Path, name: &str) -> Result<PathBuf> {
    let target = project.module_path(name);
    if target.exists() {
        debug!(path = %target.display(), "replacing existing module");
        std::fs::remove_dir_all(&target)
            .with_context(|| format!("Error removing directory {}", target.display()))?;
    }
    std::fs::create_dir_all(project.module_dir())?;
    std::fs::rename(from, &target).with_context(|| {
        format!("Error moving {} to {}", from.display(), target.display())
    })?;
    Ok(target)
}

/// A scratch directory under the project root, removed on drop.
///
/// Living under the root keeps the final rename on one filesystem.
fn staging_dir(project: &Project) -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(".ace-")
        .tempdir_in(&project.root)
        .with_context(|| format!("Could not create staging directory in {}", project.root.display()))
}

fn clone_dir_for(staging: &TempDir, url: &str) -> PathBuf {
    match repo_name_from_url(url) {
        "" => staging.path().join("module"),
        name => staging.path().join(name),
    }
}
