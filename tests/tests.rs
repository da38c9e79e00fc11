use tempfile::TempDir;
use ace::*;
use ace::text::extract_between;

fn entry(repo: &str, commit: &str, tags: &[&str]) -> LockEntry {
    LockEntry {
        repo: repo.to_string(),
        timestamp: "2025-03-14T09:26:53".to_string(),
        commit_hash: commit.to_string(),
        requested_version: String::new(),
        branch: "main".to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

fn setup_tests() -> (TempDir, Project) {
    let temp_dir = TempDir::new().unwrap();
    let project = Project::new(temp_dir.path(), Settings::default());
    (temp_dir, project)
}


#[cfg(test)]
mod tests {
    use std::fs;
    use super::*;

    #[test]
    fn test_two_modules_round_trip_through_file() {
        let (_dir, project) = setup_tests();
        let mut lock = AceLock::new();
        lock.upsert("core", entry(
            "https://github.com/acid/core",
            "9fceb02d0ae598e95dc970b74767f19372d61af8",
            &["v2.0.0", "v2", "latest"],
        ));
        lock.upsert("http", entry(
            "https://github.com/acid/http",
            "e83c5163316f89bfbde7d9ab23ca2e25604af290",
            &[],
        ));
        lock.save(project.lock_file()).unwrap();

        let text = fs::read_to_string(project.lock_file()).unwrap();
        assert_eq!(text.matches("\"tags\"").count(), 1);

        let loaded = AceLock::load(project.lock_file()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("core").unwrap().tags, vec!["v2.0.0", "v2", "latest"]);
        assert!(loaded.get("http").unwrap().tags.is_empty());
        assert_eq!(loaded, lock);
    }

    #[test]
    fn test_rewrite_is_byte_identical() {
        let (_dir, project) = setup_tests();
        let mut lock = AceLock::new();
        lock.upsert("zeta", entry("https://example.com/zeta", "", &["t1"]));
        lock.upsert("alpha", entry("https://example.com/alpha", "abc", &[]));
        lock.save(project.lock_file()).unwrap();
        let first = fs::read(project.lock_file()).unwrap();

        AceLock::load(project.lock_file()).unwrap().save(project.lock_file()).unwrap();
        let second = fs::read(project.lock_file()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_hand_written_lockfile_with_extras() {
        let (_dir, project) = setup_tests();
        fs::write(project.lock_file(), r#"{
  "core": {
    "repo": "https://github.com/acid/core",
    "checksum": "sha256:deadbeef",
    "timestamp": "2025-01-01T10:00:00",
    "tags": ["v1"]
  },

  "http": {
    "branch": "dev"
  }
}
"#).unwrap();
        let lock = AceLock::load(project.lock_file()).unwrap();
        assert_eq!(lock.len(), 2);
        let core = lock.get("core").unwrap();
        assert_eq!(core.repo, "https://github.com/acid/core");
        assert_eq!(core.timestamp, "2025-01-01T10:00:00");
        assert_eq!(core.tags, vec!["v1"]);
        assert_eq!(lock.get("http").unwrap().branch, "dev");
    }

    #[test]
    fn test_empty_lockfile_file_is_empty_mapping() {
        let (_dir, project) = setup_tests();
        fs::write(project.lock_file(), "").unwrap();
        assert!(AceLock::load(project.lock_file()).unwrap().is_empty());
    }

    #[test]
    fn test_upsert_overwrites_and_remove_deletes() {
        let (_dir, project) = setup_tests();
        let mut lock = AceLock::load_or_default(project.lock_file()).unwrap();
        lock.upsert("core", entry("https://a", "1", &[]));
        lock.upsert("core", entry("https://b", "2", &[]));
        lock.save(project.lock_file()).unwrap();

        let mut lock = AceLock::load(project.lock_file()).unwrap();
        assert_eq!(lock.get("core").unwrap().repo, "https://b");
        assert!(lock.remove("core").is_some());
        lock.save(project.lock_file()).unwrap();
        assert!(AceLock::load(project.lock_file()).unwrap().is_empty());
    }

    #[test]
    fn test_descriptor_round_trip() {
        let (_dir, project) = setup_tests();
        let mut descriptor = ModuleDescriptor::default("Acid Std");
        descriptor.author = "grace".to_string();
        descriptor.save(project.descriptor_file()).unwrap();
        let loaded = ModuleDescriptor::load(project.descriptor_file()).unwrap();
        assert_eq!(loaded, descriptor);
        assert_eq!(loaded.name, "acid_std");
    }

    #[test]
    fn test_extract_between_examples() {
        assert_eq!(extract_between("\"repo\": \"x\"", "\"repo\": \"", "\""), "x");
        assert_eq!(extract_between("foo", "\"a\"", "\"b\""), "");
    }

    #[test]
    fn test_custom_lock_location() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::from_toml("lock_file = \"locks/deps.lock\"").unwrap();
        let project = Project::new(temp_dir.path(), settings);
        let mut lock = AceLock::new();
        lock.upsert("core", entry("https://a", "1", &[]));
        lock.save(project.lock_file()).unwrap();
        assert!(temp_dir.path().join("locks").join("deps.lock").exists());
    }
}
