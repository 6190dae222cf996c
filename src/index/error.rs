//! Error types for index operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from index operations.
///
/// Only whole-index failures surface here. Per-file read problems during a
/// rebuild are collected in the rebuild stats instead.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Wiki root not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Wiki root is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
