//! Leading-edge debouncing for file change events.
//!
//! Editors often write a file several times in quick succession (save,
//! format, metadata touch). The first event for a path is accepted and
//! every further event for that path inside the window is dropped.
//!
//! This is best-effort: when writes keep arriving inside the window, the
//! final write is not guaranteed to be seen.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Tracks the last accepted event time per path.
#[derive(Debug)]
pub struct Debouncer {
    /// path -> time of the last accepted event.
    accepted: HashMap<PathBuf, Instant>,
    window: Duration,
}

impl Debouncer {
    /// Create a new debouncer with the given window in milliseconds.
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            accepted: HashMap::new(),
            window: Duration::from_millis(debounce_ms),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Gate an event observed now. Returns `true` if it should be processed.
    pub fn accept(&mut self, path: &Path) -> bool {
        self.accept_at(path, Instant::now())
    }

    /// Gate an event observed at `now`.
    pub fn accept_at(&mut self, path: &Path, now: Instant) -> bool {
        let within_window = self
            .accepted
            .get(path)
            .is_some_and(|last| now.saturating_duration_since(*last) < self.window);
        if within_window {
            return false;
        }
        self.accepted.insert(path.to_path_buf(), now);
        true
    }

    /// Forget paths whose window has closed.
    pub fn prune(&mut self, now: Instant) {
        let window = self.window;
        self.accepted
            .retain(|_, last| now.saturating_duration_since(*last) < window);
    }

    /// Number of paths still inside their window.
    pub fn tracked_count(&self) -> usize {
        self.accepted.len()
    }
}
