use std::fs;
use std::path::Path;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const LOCK: &str = r#"{
  "core": {
    "repo": "https://github.com/acid/core",
    "timestamp": "2025-05-01T08:00:00",
    "commit_hash": "9fceb02d0ae598e95dc970b74767f19372d61af8",
    "requested_version": "v1.0.0",
    "branch": "main",
    "tags": ["v1.0.0"]
  },
  "http": {
    "repo": "https://github.com/acid/http",
    "timestamp": "2025-05-02T08:00:00",
    "commit_hash": "e83c5163316f89bfbde7d9ab23ca2e25604af290"
  }
}
"#;

fn ace(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ace").unwrap();
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(dir.join("no-such-config.toml"));
    cmd
}

#[test]
fn test_version() {
    let dir = tempdir().unwrap();
    ace(dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_init_creates_descriptor() {
    let dir = tempdir().unwrap();
    ace(dir.path())
        .args(["init", "--name", "greeter", "--author", "Ada", "--module-version", "1.2.3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized module."));

    let content = fs::read_to_string(dir.path().join("module.acidcfg")).unwrap();
    assert_eq!(
        content,
        "{\n  \"name\": \"greeter\",\n  \"author\": \"Ada\",\n  \"version\": \"1.2.3\"\n}\n"
    );
}

#[test]
fn test_init_refuses_to_overwrite() {
    let dir = tempdir().unwrap();
    ace(dir.path()).args(["init", "--name", "one"]).assert().success();
    ace(dir.path())
        .args(["init", "--name", "two"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    let content = fs::read_to_string(dir.path().join("module.acidcfg")).unwrap();
    assert!(content.contains("\"one\""));
}

#[test]
fn test_init_rejects_bad_version() {
    let dir = tempdir().unwrap();
    ace(dir.path())
        .args(["init", "--module-version", "banana"])
        .assert()
        .failure();
    assert!(!dir.path().join("module.acidcfg").exists());
}

#[test]
fn test_list_without_lockfile_fails() {
    let dir = tempdir().unwrap();
    ace(dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No lockfile found"));
}

#[test]
fn test_list_and_info() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("acid.lock"), LOCK).unwrap();

    ace(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "- core (v1.0.0) @ https://github.com/acid/core (installed 2025-05-01T08:00:00)",
        ))
        .stdout(predicate::str::contains("- http (e83c516) @ https://github.com/acid/http"));

    ace(dir.path())
        .args(["info", "core"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Repository: https://github.com/acid/core"))
        .stdout(predicate::str::contains("Tags: v1.0.0"))
        .stdout(predicate::str::contains("not found in"));

    ace(dir.path())
        .args(["info", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Module 'nope' not found"));
}

#[test]
fn test_info_rejects_path_like_module_name() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("acid.lock"),
        "{\n  \"../outside\": {\n    \"repo\": \"https://github.com/acid/core\"\n  }\n}\n",
    )
    .unwrap();
    ace(dir.path())
        .args(["info", "../outside"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid module name '../outside'"));
}

#[test]
fn test_list_json() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("acid.lock"), LOCK).unwrap();
    let output = ace(dir.path())
        .args(["list", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["core"]["tags"][0], "v1.0.0");
    assert_eq!(value["http"]["tags"].as_array().unwrap().len(), 0);
}

#[test]
fn test_list_empty_lockfile() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("acid.lock"), "{\n}\n").unwrap();
    ace(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No modules installed."));
}

#[test]
fn test_tree() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("acid.lock"), LOCK).unwrap();
    ace(dir.path()).args(["init", "--name", "app"]).assert().success();
    ace(dir.path())
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("* app\n"))
        .stdout(predicate::str::contains("├── - core (v1.0.0)"))
        .stdout(predicate::str::contains("└── - http (e83c516)"));
}

#[test]
fn test_remove() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("acid.lock"), LOCK).unwrap();
    fs::create_dir_all(dir.path().join("pkg").join("core")).unwrap();

    ace(dir.path())
        .args(["remove", "core"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed core from lock file."));

    assert!(!dir.path().join("pkg").join("core").exists());
    let lock = fs::read_to_string(dir.path().join("acid.lock")).unwrap();
    assert!(!lock.contains("\"core\""));
    assert!(lock.contains("\"http\""));

    ace(dir.path())
        .args(["remove", "core"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Module 'core' not found"));
}

#[test]
fn test_custom_paths() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("deps.lock"), LOCK).unwrap();
    fs::create_dir_all(dir.path().join("vendor").join("http")).unwrap();
    ace(dir.path())
        .args(["--lock-file", "deps.lock", "--module-dir", "vendor", "remove", "http"])
        .assert()
        .success();
    assert!(!dir.path().join("vendor").join("http").exists());
    assert!(!dir.path().join("acid.lock").exists());
}

#[test]
fn test_settings_file() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("ace.toml");
    fs::write(&config, "lock_file = \"deps.lock\"\n").unwrap();
    fs::write(dir.path().join("deps.lock"), LOCK).unwrap();
    Command::cargo_bin("ace").unwrap()
        .current_dir(dir.path())
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(&config)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("- core"));
}

#[cfg(test)]
mod git_workflows {
    use super::*;

    fn git_available() -> bool {
        which::which("git").is_ok()
    }

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = std::process::Command::new("git")
            .args([
                "-c", "user.name=Ace Test",
                "-c", "user.email=ace@example.com",
                "-c", "init.defaultBranch=main",
                "-c", "commit.gpgsign=false",
                "-c", "tag.gpgsign=false",
            ])
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(output.status.success(), "git {:?}: {}", args, String::from_utf8_lossy(&output.stderr));
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// A repository with a descriptor for module `greeter`, tagged `v1.0.0`.
    fn upstream(dir: &Path) {
        git(dir, &["init", "--quiet"]);
        fs::write(
            dir.join("module.acidcfg"),
            "{\n  \"name\": \"greeter\",\n  \"author\": \"Ada\",\n  \"version\": \"1.0.0\"\n}\n",
        )
        .unwrap();
        fs::write(dir.join("greeter.acid"), "fn greet() {}\n").unwrap();
        git(dir, &["add", "."]);
        git(dir, &["commit", "--quiet", "-m", "initial"]);
        git(dir, &["tag", "v1.0.0"]);
    }

    #[test]
    fn test_install_upgrade_restore() {
        if !git_available() {
            return;
        }
        let remote = tempdir().unwrap();
        let project = tempdir().unwrap();
        upstream(remote.path());
        let tagged = git(remote.path(), &["rev-parse", "HEAD"]);
        let source = format!("{}@v1.0.0", remote.path().display());

        ace(project.path())
            .args(["install", &source])
            .assert()
            .success()
            .stdout(predicate::str::contains("Lockfile updated"));

        let installed = project.path().join("pkg").join("greeter");
        assert!(installed.join("greeter.acid").exists());
        let lock = fs::read_to_string(project.path().join("acid.lock")).unwrap();
        assert!(lock.contains("\"greeter\": {"));
        assert!(lock.contains(&format!("\"commit_hash\": \"{}\"", tagged)));
        assert!(lock.contains("\"requested_version\": \"v1.0.0\""));
        assert!(lock.contains("\"tags\": [\"v1.0.0\"]"));
        // no staging directories left behind
        let leftovers = fs::read_dir(project.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".ace-"))
            .count();
        assert_eq!(leftovers, 0);

        fs::write(remote.path().join("greeter.acid"), "fn greet() { hello() }\n").unwrap();
        git(remote.path(), &["commit", "--quiet", "-am", "second"]);
        let head = git(remote.path(), &["rev-parse", "HEAD"]);

        ace(project.path())
            .arg("upgrade")
            .assert()
            .success()
            .stdout(predicate::str::contains("Updated greeter"));
        let lock = fs::read_to_string(project.path().join("acid.lock")).unwrap();
        assert!(lock.contains(&format!("\"commit_hash\": \"{}\"", head)));
        assert!(!lock.contains("requested_version"));
        assert!(!lock.contains("\"tags\""));

        ace(project.path())
            .arg("upgrade")
            .assert()
            .success()
            .stdout(predicate::str::contains("already up to date"));

        fs::remove_dir_all(project.path().join("pkg")).unwrap();
        ace(project.path())
            .arg("restore")
            .assert()
            .success()
            .stdout(predicate::str::contains("Restored greeter"));
        let restored = fs::read_to_string(installed.join("greeter.acid")).unwrap();
        assert!(restored.contains("hello()"));
    }

    #[test]
    fn test_install_without_descriptor_fails() {
        if !git_available() {
            return;
        }
        let remote = tempdir().unwrap();
        let project = tempdir().unwrap();
        git(remote.path(), &["init", "--quiet"]);
        fs::write(remote.path().join("README"), "no descriptor\n").unwrap();
        git(remote.path(), &["add", "."]);
        git(remote.path(), &["commit", "--quiet", "-m", "initial"]);

        ace(project.path())
            .args(["install", &remote.path().display().to_string()])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No module descriptor found"));
        assert!(!project.path().join("acid.lock").exists());
        assert!(!project.path().join("pkg").exists());
    }
}
