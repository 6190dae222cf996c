//! The live wiki index.
//!
//! Readers go through one reader/writer lock around an `Arc<IndexSnapshot>`.
//! Rebuilds parse into a fresh snapshot without holding that lock and swap it
//! in at the end, so readers keep seeing the old index until the new one is
//! complete. Incremental updates read the file first and take the write lock
//! only for the map mutation.
//!
//! Writers are serialized by a separate mutex held from the first file read
//! to the final mutation. An update that arrives during a rebuild waits for
//! the swap and is then applied on top of it.

use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use super::error::{IndexError, IndexResult};
use super::snapshot::IndexSnapshot;
use super::walker::{self, DocumentWalker};
use crate::parsing::{ParsedDocument, Term, WikiParser};
use crate::utils::now_millis;

/// Statistics from a full rebuild.
#[derive(Debug, Clone, Default)]
pub struct RebuildStats {
    /// Documents parsed successfully.
    pub files_indexed: usize,
    /// Terms extracted.
    pub terms: usize,
    /// Formulas extracted.
    pub formulas: usize,
    /// Distinct scopes found.
    pub scopes: usize,
    /// Documents that could not be read, with the reason.
    pub errors: Vec<(PathBuf, String)>,
    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

/// Outcome of a single-file update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileUpdate {
    /// The file was re-parsed and its facts inserted.
    Indexed { terms: usize, formulas: usize },
    /// The file is gone or unreadable; its old entries were removed.
    Removed,
}

/// Concurrent index over a wiki directory.
#[derive(Debug)]
pub struct WikiIndex {
    root: PathBuf,
    parser: WikiParser,
    state: RwLock<Arc<IndexSnapshot>>,
    writer: Mutex<()>,
}

impl WikiIndex {
    /// Create an empty index for `.md` documents below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_parser(root, WikiParser::default())
    }

    /// Create an empty index for documents with a custom extension.
    pub fn with_extension(root: impl Into<PathBuf>, extension: &str) -> Self {
        Self::with_parser(root, WikiParser::new(extension))
    }

    fn with_parser(root: impl Into<PathBuf>, parser: WikiParser) -> Self {
        Self {
            root: root.into(),
            parser,
            state: RwLock::new(Arc::new(IndexSnapshot::default())),
            writer: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        self.parser.extension()
    }

    /// Rebuild the whole index from the documents below the root.
    ///
    /// Fails only when the root itself is missing or not a directory; the
    /// previous index is kept in that case. Unreadable documents are skipped
    /// and reported in [`RebuildStats::errors`].
    pub fn rebuild(&self) -> IndexResult<RebuildStats> {
        let start = Instant::now();
        self.check_root()?;
        let _writer = self.writer.lock();

        crate::debug_event!("index", "rebuilding", "{}", self.root.display());

        let files = DocumentWalker::new(self.parser.extension()).walk(&self.root);

        let parsed: Vec<(PathBuf, std::io::Result<ParsedDocument>)> = files
            .into_par_iter()
            .filter_map(|path| {
                let relative = walker::relative_path(&self.root, &path)?;
                let result = self.parser.parse_file(&path, &relative);
                Some((path, result))
            })
            .collect();

        let mut fresh = IndexSnapshot::default();
        let mut scopes = BTreeSet::new();
        let mut stats = RebuildStats::default();

        for (path, result) in parsed {
            match result {
                Ok(document) => {
                    if !document.scope.is_empty() {
                        scopes.insert(document.scope.clone());
                    }
                    let (terms, formulas) = fresh.insert_document(document);
                    stats.files_indexed += 1;
                    stats.terms += terms;
                    stats.formulas += formulas;
                }
                Err(e) => {
                    tracing::warn!("[index] failed to read {}: {e}", path.display());
                    stats.errors.push((path, e.to_string()));
                }
            }
        }

        stats.scopes = scopes.len();
        fresh.set_scopes(scopes.into_iter().collect());
        fresh.stamp(now_millis());

        *self.state.write() = Arc::new(fresh);

        stats.duration_ms = start.elapsed().as_millis() as u64;
        crate::log_event!(
            "index",
            "rebuilt",
            "{} files, {} terms, {} formulas in {}ms",
            stats.files_indexed,
            stats.terms,
            stats.formulas,
            stats.duration_ms
        );

        Ok(stats)
    }

    /// Re-index one document.
    ///
    /// Old entries for `relative_path` are always removed. If the file can
    /// still be read its new facts are inserted; otherwise this is a removal.
    /// The scope list is not recomputed here, only by [`rebuild`](Self::rebuild).
    pub fn update_file(&self, relative_path: &str) -> FileUpdate {
        let _writer = self.writer.lock();
        let full_path = self.root.join(relative_path);

        let parsed = match self.parser.parse_file(&full_path, relative_path) {
            Ok(document) => Some(document),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("[index] failed to read {relative_path}: {e}");
                None
            }
        };

        let mut guard = self.state.write();
        let state = Arc::make_mut(&mut guard);
        state.remove_file(relative_path);

        let outcome = match parsed {
            Some(document) => {
                let (terms, formulas) = state.insert_document(document);
                FileUpdate::Indexed { terms, formulas }
            }
            None => FileUpdate::Removed,
        };
        state.stamp(now_millis());

        outcome
    }

    /// Remove every entry from one document. Returns the entries removed.
    pub fn remove_file(&self, relative_path: &str) -> usize {
        let _writer = self.writer.lock();
        let mut guard = self.state.write();
        let state = Arc::make_mut(&mut guard);
        let removed = state.remove_file(relative_path);
        state.stamp(now_millis());
        removed
    }

    /// Remove every document below a directory. Returns the removed paths.
    pub fn remove_directory(&self, relative_dir: &str) -> Vec<String> {
        let prefix = format!("{}/", relative_dir.trim_end_matches('/'));

        let _writer = self.writer.lock();
        let mut guard = self.state.write();
        let mut paths: Vec<String> = guard
            .file_paths()
            .into_iter()
            .filter(|path| path.starts_with(&prefix))
            .map(str::to_string)
            .collect();
        paths.sort();

        if !paths.is_empty() {
            let state = Arc::make_mut(&mut guard);
            for path in &paths {
                state.remove_file(path);
            }
            state.stamp(now_millis());
        }

        paths
    }

    /// Current index state. The returned snapshot is immutable.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        Arc::clone(&self.state.read())
    }

    /// Case-insensitive alias substring search. See [`IndexSnapshot::search`].
    pub fn search(&self, query: &str) -> Vec<Arc<Term>> {
        self.state.read().search(query)
    }

    /// Terms registered under an exact alias.
    pub fn lookup(&self, alias: &str) -> Vec<Arc<Term>> {
        self.state.read().lookup(alias).to_vec()
    }

    pub fn all_terms(&self) -> Vec<Arc<Term>> {
        self.state.read().all_terms()
    }

    pub fn scopes(&self) -> Vec<String> {
        self.state.read().scopes().to_vec()
    }

    pub fn build_time(&self) -> i64 {
        self.state.read().build_time()
    }

    pub fn term_count(&self) -> usize {
        self.state.read().term_count()
    }

    fn check_root(&self) -> IndexResult<()> {
        match std::fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(IndexError::NotADirectory {
                path: self.root.clone(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(IndexError::RootNotFound {
                path: self.root.clone(),
            }),
            Err(e) => Err(IndexError::Io {
                path: self.root.clone(),
                source: e,
            }),
        }
    }
}
