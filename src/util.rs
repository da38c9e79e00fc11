use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use anyhow::{Context, Result};
use regex::Regex;
use semver::Version;
use tempfile::NamedTempFile;
use tracing::debug;

/// Layout used for `timestamp` fields: local time, no timezone.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static MODULE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9_.\-]*$").expect("module name pattern is valid")
});

/// Returns the current local time formatted for the lockfile.
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Splits `<url>@<rev>` into the URL and the requested revision.
///
/// The split happens at the last `@`, and only if what follows has no `/`
/// or `:`. That keeps scp-style URLs such as `git@github.com:user/repo`
/// intact.
pub fn split_source(source: &str) -> (&str, Option<&str>) {
    match source.rsplit_once('@') {
        Some((url, rev))
            if !url.is_empty()
                && !rev.is_empty()
                && !rev.contains('/')
                && !rev.contains(':') =>
        {
            (url, Some(rev))
        }
        _ => (source, None),
    }
}

/// Returns the repository name of a git URL: the last path segment without `.git`.
pub fn repo_name_from_url(url: &str) -> &str {
    let last = url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(url);
    last.strip_suffix(".git").unwrap_or(last)
}

/// Returns the 7-character abbreviation of a commit hash, if it is long enough.
pub fn short_hash(hash: &str) -> Option<&str> {
    hash.get(..7)
}

/// Lowercases `raw` and replaces spaces with underscores.
pub fn normalize_module_name(raw: &str) -> String {
    raw.to_lowercase().replace(' ', "_")
}

/// Checks that `name` is a lowercase, space-free identifier that is safe to
/// use as a directory name.
pub fn is_valid_module_name(name: &str) -> bool {
    MODULE_NAME.is_match(name) && name != "." && name != ".."
}

/// Validates whether a version string is a valid SemVer version.
/// Ignores build metadata and pre-release suffixes.
pub fn is_valid_version(version: &str) -> bool {
    let version = version.split(['-', '+']).next().unwrap_or(version);
    Version::parse(version).is_ok()
}

/// Writes `content` to `path` through a temporary file in the same
/// directory, then renames it into place.
///
/// Readers see either the old document or the new one, never a truncated one.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)
        .with_context(|| format!("Could not create directory {}", parent.display()))?;

    let mut tmp = NamedTempFile::new_in(&parent)
        .with_context(|| format!("Could not create temporary file in {}", parent.display()))?;
    tmp.write_all(content.as_bytes())
        .with_context(|| format!("Could not write {}", path.display()))?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("Could not replace {}", path.display()))?;
    debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

/// Reads a whole file, mapping "not found" to `None`.
pub fn read_optional<P: AsRef<Path>>(path: P) -> Result<Option<String>> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Could not read {}", path.display())),
    }
}
