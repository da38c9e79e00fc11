use crate::lock::AceLock;

/// Renders installed modules as a one-level tree under `root_name`.
///
/// ```text
/// * app
/// ├── - core (v1.0.0)
/// │    branch: main
/// └── - http (4f2a9c1)
///       tags: v0.3.0
/// ```
pub fn render_tree(root_name: &str, lock: &AceLock) -> String {
    let mut out = format!("* {}\n", root_name);
    let count = lock.len();
    for (i, (name, entry)) in lock.iter().enumerate() {
        let is_last = i + 1 == count;
        let (prefix, info_prefix) = if is_last {
            ("└──", "     ")
        } else {
            ("├──", "│   ")
        };
        let version = entry.version_label().unwrap_or_else(|| String::from("latest"));
        out.push_str(&format!("{} - {} ({})\n", prefix, name, version));
        if !entry.branch.is_empty() {
            out.push_str(&format!("{} branch: {}\n", info_prefix, entry.branch));
        }
        if let Some(tag) = entry.tags.first() {
            out.push_str(&format!("{} tags: {}\n", info_prefix, tag));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::LockEntry;

    #[test]
    fn test_render_tree() {
        let mut lock = AceLock::new();
        lock.upsert(
            "core",
            LockEntry {
                requested_version: "v1.0.0".to_string(),
                branch: "main".to_string(),
                ..LockEntry::default()
            },
        );
        lock.upsert(
            "http",
            LockEntry {
                commit_hash: "4f2a9c1e8b7d".to_string(),
                tags: vec!["v0.3.0".to_string(), "v0.3".to_string()],
                ..LockEntry::default()
            },
        );
        lock.upsert("util", LockEntry::default());

        let expected = "* app\n\
                        ├── - core (v1.0.0)\n\
                        │    branch: main\n\
                        ├── - http (4f2a9c1)\n\
                        │    tags: v0.3.0\n\
                        └── - util (latest)\n";
        assert_eq!(render_tree("app", &lock), expected);
    }

    #[test]
    fn test_render_tree_last_module_details() {
        let mut lock = AceLock::new();
        lock.upsert(
            "core",
            LockEntry {
                branch: "dev".to_string(),
                ..LockEntry::default()
            },
        );
        assert_eq!(
            render_tree("app", &lock),
            "* app\n└── - core (latest)\n      branch: dev\n"
        );
    }

    #[test]
    fn test_render_tree_empty() {
        assert_eq!(render_tree("app", &AceLock::new()), "* app\n");
    }
}
