//! Document discovery below the wiki root.
//!
//! Hidden entries (names starting with `.`) are skipped everywhere: they do
//! not appear in the file tree, are not indexed and their watcher events are
//! ignored.

use ignore::WalkBuilder;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Walks a directory tree and yields documents with the configured extension.
#[derive(Debug, Clone)]
pub struct DocumentWalker {
    extension: String,
}

impl DocumentWalker {
    /// Create a walker for documents ending in `.{extension}`.
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Walk `root` and return every document, sorted by path.
    ///
    /// Unreadable entries are logged and skipped.
    pub fn walk(&self, root: &Path) -> Vec<PathBuf> {
        let mut builder = WalkBuilder::new(root);

        // Plain wiki trees: no gitignore semantics, only hidden filtering.
        builder
            .standard_filters(false)
            .hidden(true)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        builder
            .build()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("[index] skipping unreadable entry: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| has_extension(path, &self.extension))
            .collect()
    }
}

/// Whether a file name marks a hidden entry.
pub fn is_hidden_name(name: &OsStr) -> bool {
    name.to_str().is_some_and(|name| name.starts_with('.'))
}

/// Whether any component of a relative path is hidden.
pub fn has_hidden_component(relative_path: &str) -> bool {
    relative_path.split('/').any(|part| part.starts_with('.'))
}

/// Whether `path` ends in `.{extension}`.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == extension)
}

/// Path of `path` relative to `root`, `/`-separated.
///
/// Returns `None` for paths outside `root` or for `root` itself.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rest = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rest
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Resolve a client-supplied relative path below `root`.
///
/// Rejects absolute paths and any `..` component.
pub fn resolve_relative(root: &Path, relative_path: &str) -> Option<PathBuf> {
    let candidate = Path::new(relative_path);
    let safe = candidate
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));

    if safe && candidate.components().next().is_some() {
        Some(root.join(candidate))
    } else {
        None
    }
}
