//! File tree of the wiki root, as shown in the browser sidebar.

use serde::Serialize;
use std::cmp::Ordering;
use std::path::Path;

use crate::index::walker::{has_extension, is_hidden_name};

/// One entry of the file tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTreeNode {
    pub name: String,
    /// Path relative to the wiki root, `/`-separated.
    pub path: String,
    pub is_directory: bool,
    /// Present for directories only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileTreeNode>>,
}

/// Build the tree below `root`.
///
/// Hidden entries are left out, files only appear when they carry the
/// document extension, directories always appear. Directories come first,
/// then entries by name. An unreadable directory contributes no children.
pub fn build_file_tree(root: &Path, extension: &str) -> Vec<FileTreeNode> {
    build_level(root, "", extension)
}

fn build_level(dir: &Path, prefix: &str, extension: &str) -> Vec<FileTreeNode> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("[files] cannot read {}: {e}", dir.display());
            return Vec::new();
        }
    };

    let mut nodes: Vec<FileTreeNode> = entries
        .filter_map(Result::ok)
        .filter(|entry| !is_hidden_name(&entry.file_name()))
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };
            let is_directory = entry.file_type().ok()?.is_dir();

            if is_directory {
                let children = build_level(&entry.path(), &path, extension);
                Some(FileTreeNode {
                    name,
                    path,
                    is_directory,
                    children: Some(children),
                })
            } else if has_extension(&entry.path(), extension) {
                Some(FileTreeNode {
                    name,
                    path,
                    is_directory,
                    children: None,
                })
            } else {
                None
            }
        })
        .collect();

    nodes.sort_by(|a, b| match (a.is_directory, b.is_directory) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    });
    nodes
}
