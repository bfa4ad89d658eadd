//! Finding crumb files across directories
//!
//! - [`bubble_up`] follows the trail from a directory towards the root
//! - [`walk_down`] collects crumb files below a directory, depth-limited

use std::fs;
use std::path::{Path, PathBuf};

/// Existing crumb files in `dir` and its ancestors, nearest first
///
/// Stops before `stop_at`, or after the filesystem root when `stop_at`
/// is not an ancestor of `dir`.
pub fn bubble_up(dir: &Path, stop_at: &Path, file_name: &str) -> Vec<PathBuf> {
    dir.ancestors()
        .take_while(|ancestor| *ancestor != stop_at)
        .map(|ancestor| ancestor.join(file_name))
        .filter(|path| path.is_file())
        .collect()
}

/// Existing crumb files in `dir` and the directories below it
///
/// Directories are visited in name order; `max_depth` counts directory
/// levels, so `1` only looks at `dir` itself. Unreadable directories are
/// skipped.
pub fn walk_down(dir: &Path, file_name: &str, max_depth: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();
    walk(dir, file_name, 0, max_depth, &mut found);
    found
}

fn walk(dir: &Path, file_name: &str, depth: usize, max_depth: usize, found: &mut Vec<PathBuf>) {
    if depth >= max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    let mut entries: Vec<_> = entries.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if entry.file_name() == file_name && path.is_file() {
            found.push(path);
        } else if path.is_dir() {
            walk(&path, file_name, depth + 1, max_depth, found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "2023-01-01 10:00:00 crumb\n").unwrap();
    }

    #[test]
    fn bubble_up_collects_nearest_first() {
        let root = TempDir::new().unwrap();
        let deep = root.path().join("a").join("b").join("c");
        fs::create_dir_all(&deep).unwrap();
        touch(&deep.join(".crumb"));
        touch(&root.path().join("a").join(".crumb"));
        touch(&root.path().join(".crumb"));

        let found = bubble_up(&deep, root.path(), ".crumb");
        assert_eq!(
            found,
            vec![deep.join(".crumb"), root.path().join("a").join(".crumb")]
        );
    }

    #[test]
    fn bubble_up_without_stop_reaches_root() {
        let root = TempDir::new().unwrap();
        let deep = root.path().join("x");
        fs::create_dir_all(&deep).unwrap();
        touch(&root.path().join(".crumb"));

        let found = bubble_up(&deep, Path::new("/definitely/not/an/ancestor"), ".crumb");
        assert!(found.contains(&root.path().join(".crumb")));
    }

    #[test]
    fn bubble_up_stopping_at_self_finds_nothing() {
        let root = TempDir::new().unwrap();
        touch(&root.path().join(".crumb"));

        assert!(bubble_up(root.path(), root.path(), ".crumb").is_empty());
    }

    #[test]
    fn walk_down_respects_depth() {
        let root = TempDir::new().unwrap();
        touch(&root.path().join(".crumb"));
        touch(&root.path().join("b").join(".crumb"));
        touch(&root.path().join("a").join(".crumb"));
        touch(&root.path().join("a").join("deeper").join(".crumb"));
        touch(&root.path().join("a").join("deeper").join("deepest").join(".crumb"));

        let found = walk_down(root.path(), ".crumb", 3);
        assert_eq!(
            found,
            vec![
                root.path().join(".crumb"),
                root.path().join("a").join(".crumb"),
                root.path().join("a").join("deeper").join(".crumb"),
                root.path().join("b").join(".crumb"),
            ]
        );

        assert_eq!(walk_down(root.path(), ".crumb", 1), vec![root.path().join(".crumb")]);
        assert!(walk_down(root.path(), ".crumb", 0).is_empty());
    }

    #[test]
    fn walk_down_ignores_other_files() {
        let root = TempDir::new().unwrap();
        touch(&root.path().join("notes.txt"));

        assert!(walk_down(root.path(), ".crumb", 3).is_empty());
    }
}
