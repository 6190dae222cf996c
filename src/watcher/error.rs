//! Error types for the wiki watcher.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from watcher operations.
///
/// Only setup failures end the watch loop. Errors reported by the OS
/// notification channel while running are logged and skipped.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    #[error("Cannot watch path {path}: {reason}")]
    PathWatchFailed { path: PathBuf, reason: String },
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}

/// Result type for watcher operations.
pub type WatchResult<T> = Result<T, WatchError>;
