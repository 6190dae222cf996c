//! Registry of watched directories.
//!
//! Directories are watched one by one (non-recursively), so the watcher
//! needs to know which ones it has registered: to add the subtree of a newly
//! created directory and to recognise a removed path as a directory after it
//! is gone.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::index::walker::is_hidden_name;

/// Set of directories currently registered with the OS watcher.
#[derive(Debug, Default)]
pub struct DirectoryRegistry {
    dirs: HashSet<PathBuf>,
}

impl DirectoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `dir` and every non-hidden directory below it.
    ///
    /// Returns the directories that were not registered before, parents
    /// before children.
    pub fn discover(&mut self, dir: &Path) -> Vec<PathBuf> {
        let mut new_dirs = Vec::new();

        let walker = WalkDir::new(dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden_name(entry.file_name()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("[watcher] skipping unreadable directory entry: {e}");
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let path = entry.into_path();
            if self.dirs.insert(path.clone()) {
                new_dirs.push(path);
            }
        }

        new_dirs
    }

    /// Whether `path` is a registered directory.
    pub fn contains(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    /// Forget `dir` and everything registered below it. Returns what was removed.
    pub fn forget_tree(&mut self, dir: &Path) -> Vec<PathBuf> {
        let mut removed: Vec<PathBuf> = self
            .dirs
            .iter()
            .filter(|path| path.starts_with(dir))
            .cloned()
            .collect();
        removed.sort();

        for path in &removed {
            self.dirs.remove(path);
        }
        removed
    }

    /// Get count of watched directories.
    pub fn dir_count(&self) -> usize {
        self.dirs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_skips_hidden_and_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("combat/skills")).unwrap();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::write(root.join("combat/hp.md"), "x").unwrap();

        let mut registry = DirectoryRegistry::new();
        let dirs = registry.discover(root);

        assert_eq!(
            dirs,
            vec![
                root.to_path_buf(),
                root.join("combat"),
                root.join("combat/skills")
            ]
        );
        assert!(!registry.contains(&root.join(".git")));
        assert!(!registry.contains(&root.join("combat/hp.md")));
    }

    #[test]
    fn test_discover_returns_only_new() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("a")).unwrap();

        let mut registry = DirectoryRegistry::new();
        assert_eq!(registry.discover(root).len(), 2);

        fs::create_dir(root.join("a/b")).unwrap();
        assert_eq!(registry.discover(&root.join("a")), vec![root.join("a/b")]);
        assert_eq!(registry.dir_count(), 3);
    }

    #[test]
    fn test_forget_tree() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::create_dir(root.join("ab")).unwrap();

        let mut registry = DirectoryRegistry::new();
        registry.discover(root);

        let removed = registry.forget_tree(&root.join("a"));
        assert_eq!(removed, vec![root.join("a"), root.join("a/b")]);
        // component-wise prefix: "ab" is not below "a"
        assert!(registry.contains(&root.join("ab")));
        assert_eq!(registry.dir_count(), 2);
    }

    #[test]
    fn test_discover_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = DirectoryRegistry::new();
        assert!(registry.discover(&temp_dir.path().join("nope")).is_empty());
    }
}
