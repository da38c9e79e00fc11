use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use anyhow::Result;
use serde::Serialize;
use tracing::debug;
use crate::error::AceError;
use crate::text::{is_structural, leading_key, quoted_field, quoted_list};
use crate::util::{atomic_write, read_optional, timestamp_now};

/// Field names reserved inside a lock record, in the order they are written.
pub const LOCK_FIELDS: [&str; 6] = [
    "repo",
    "timestamp",
    "commit_hash",
    "requested_version",
    "branch",
    "tags",
];

/// The state of one installed module as captured at install or upgrade time.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LockEntry {
    /// Source repository URL.
    pub repo: String,
    /// Local install time, `YYYY-MM-DDTHH:MM:SS`.
    pub timestamp: String,
    /// Full commit id checked out, empty if unknown.
    pub commit_hash: String,
    /// Tag, branch or revision the user asked for, empty for HEAD.
    pub requested_version: String,
    /// Branch checked out at capture time, empty when detached.
    pub branch: String,
    /// Tags pointing at `commit_hash`.
    pub tags: Vec<String>,
}

impl LockEntry {
    /// Builds an entry stamped with the current local time.
    pub fn captured(
        repo: &str,
        commit_hash: String,
        requested_version: &str,
        branch: String,
        tags: Vec<String>,
    ) -> Self {
        LockEntry {
            repo: repo.to_string(),
            timestamp: timestamp_now(),
            commit_hash,
            requested_version: requested_version.to_string(),
            branch,
            tags,
        }
    }

    /// A label for the installed version: requested version, short hash or `None`.
    pub fn version_label(&self) -> Option<String> {
        if !self.requested_version.is_empty() {
            return Some(self.requested_version.clone());
        }
        crate::util::short_hash(&self.commit_hash).map(String::from)
    }

    fn set_field(&mut self, field: &str, line: &str) {
        match field {
            "repo" => self.repo = quoted_field(line, field).to_string(),
            "timestamp" => self.timestamp = quoted_field(line, field).to_string(),
            "commit_hash" => self.commit_hash = quoted_field(line, field).to_string(),
            "requested_version" => {
                self.requested_version = quoted_field(line, field).to_string()
            }
            "branch" => self.branch = quoted_field(line, field).to_string(),
            "tags" => self.tags = quoted_list(line, field),
            _ => {}
        }
    }

    fn scalar_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("repo", self.repo.as_str()),
            ("timestamp", self.timestamp.as_str()),
            ("commit_hash", self.commit_hash.as_str()),
            ("requested_version", self.requested_version.as_str()),
            ("branch", self.branch.as_str()),
        ]
    }
}

/// A record header is a key followed by `{`, or by nothing when the brace
/// sits on the next line.
fn opens_record(line: &str) -> bool {
    match crate::text::after(line, "\":") {
        Some(rest) => {
            let rest = rest.trim_start();
            rest.is_empty() || rest.starts_with('{')
        }
        None => false,
    }
}

/// Contents of an `acid.lock` file: every installed module keyed by name.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct AceLock {
    pub modules: BTreeMap<String, LockEntry>,
}

impl AceLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses lockfile text.
    ///
    /// This is a line scanner, not a JSON parser. A `"token": {` line opens a
    /// new record named `token`. A `"token": value` line sets that field on the
    /// open record when `token` is one of [`LOCK_FIELDS`]. Every other line is
    /// skipped, unknown fields included.
    pub fn parse(content: &str) -> Self {
        let mut modules = BTreeMap::new();
        let mut current: Option<(String, LockEntry)> = None;

        for line in content.lines().map(str::trim) {
            if is_structural(line) {
                continue;
            }
            let Some(key) = leading_key(line) else {
                continue;
            };
            if opens_record(line) {
                if let Some((name, entry)) = current.take() {
                    modules.insert(name, entry);
                }
                current = Some((key.to_string(), LockEntry::default()));
            } else if LOCK_FIELDS.contains(&key) {
                // fields before the first record have nowhere to go
                if let Some((_, entry)) = current.as_mut() {
                    entry.set_field(key, line);
                }
            }
        }
        if let Some((name, entry)) = current {
            modules.insert(name, entry);
        }
        AceLock { modules }
    }

    /// Reads and parses the lockfile at `path`.
    ///
    /// # Errors
    /// Returns [`AceError::LockfileNotFound`] if the file does not exist, or
    /// the I/O error if it cannot be read. Malformed content is not an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match read_optional(path)? {
            Some(content) => {
                let lock = Self::parse(&content);
                debug!(path = %path.display(), modules = lock.len(), "loaded lockfile");
                Ok(lock)
            }
            None => Err(AceError::LockfileNotFound(path.to_path_buf()).into()),
        }
    }

    /// Like [`AceLock::load`], but a missing file yields an empty lockfile.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::load(path) {
            Err(e) if AceError::is_not_found(&e) => Ok(Self::new()),
            other => other,
        }
    }

    /// Writes the whole lockfile to `path`, replacing it atomically.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        atomic_write(path, &self.to_string())
    }

    /// Inserts or replaces the record for `name`.
    pub fn upsert(&mut self, name: &str, entry: LockEntry) -> Option<LockEntry> {
        self.modules.insert(name.to_string(), entry)
    }

    /// Drops the record for `name`, returning it if it existed.
    pub fn remove(&mut self, name: &str) -> Option<LockEntry> {
        self.modules.remove(name)
    }

    /// Record for `name`, if locked.
    pub fn get(&self, name: &str) -> Option<&LockEntry> {
        self.modules.get(name)
    }

    /// True if `name` has a record.
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Number of locked modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// True if no module is locked.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Records in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &LockEntry)> {
        self.modules.iter()
    }
}

/// Renders the lockfile document. Empty fields are left out, and so is an
/// empty tag list. Values are written verbatim, without escaping.
impl fmt::Display for AceLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for (i, (name, entry)) in self.modules.iter().enumerate() {
            if i > 0 {
                writeln!(f, ",")?;
            }
            writeln!(f, "  \"{name}\": {{")?;

            let mut fields: Vec<String> = entry
                .scalar_fields()
                .iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(key, value)| format!("    \"{key}\": \"{value}\""))
                .collect();
            if !entry.tags.is_empty() {
                let tags = entry
                    .tags
                    .iter()
                    .map(|tag| format!("\"{tag}\""))
                    .collect::<Vec<_>>()
                    .join(", ");
                fields.push(format!("    \"tags\": [{tags}]"));
            }
            for (j, field) in fields.iter().enumerate() {
                if j + 1 < fields.len() {
                    writeln!(f, "{field},")?;
                } else {
                    writeln!(f, "{field}")?;
                }
            }
            write!(f, "  }}")?;
        }
        if !self.modules.is_empty() {
            writeln!(f)?;
        }
        writeln!(f, "}}")
    }
}
