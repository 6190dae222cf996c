//! Wiki watcher: OS notifications in, index updates and broadcasts out.

use std::path::Path;
use std::sync::Arc;

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::error::{WatchError, WatchResult};
use super::router::EventRouter;
use crate::index::WikiIndex;
use crate::notifications::ChangeSink;

/// Default debounce window in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Default bound of the notify → event loop channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Something that can register single directories for change events.
pub trait DirectoryWatch: Send {
    fn watch_dir(&mut self, path: &Path) -> WatchResult<()>;
    fn unwatch_dir(&mut self, path: &Path) -> WatchResult<()>;
}

/// [`DirectoryWatch`] over any `notify` watcher.
pub struct NotifyBackend<W: Watcher>(W);

impl<W: Watcher + Send> DirectoryWatch for NotifyBackend<W> {
    fn watch_dir(&mut self, path: &Path) -> WatchResult<()> {
        self.0
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn unwatch_dir(&mut self, path: &Path) -> WatchResult<()> {
        self.0.unwatch(path).map_err(|e| WatchError::PathWatchFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Watches a wiki root and keeps its index current.
///
/// Every directory is registered non-recursively. Directories created later
/// are registered as their events arrive.
pub struct WikiWatcher<B: DirectoryWatch = NotifyBackend<RecommendedWatcher>> {
    router: EventRouter,
    backend: B,
    event_rx: mpsc::Receiver<notify::Result<Event>>,
    cancel: CancellationToken,
}

impl WikiWatcher {
    /// Create a builder for configuring the watcher.
    pub fn builder() -> WikiWatcherBuilder {
        WikiWatcherBuilder::new()
    }
}

impl<B: DirectoryWatch> WikiWatcher<B> {
    /// Assemble a watcher from parts. Events are read from `event_rx`.
    pub fn with_backend(
        router: EventRouter,
        backend: B,
        event_rx: mpsc::Receiver<notify::Result<Event>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            router,
            backend,
            event_rx,
            cancel,
        }
    }

    /// Run the event loop.
    ///
    /// Fails only if the initial directories cannot be watched. Returns
    /// `Ok(())` when the event channel closes or the token is cancelled.
    pub async fn watch(mut self) -> WatchResult<()> {
        let dirs = self.router.discover_root();
        if dirs.is_empty() {
            return Err(WatchError::PathWatchFailed {
                path: self.router.root().to_path_buf(),
                reason: "not a readable directory".to_string(),
            });
        }

        for dir in &dirs {
            if let Err(e) = self.backend.watch_dir(dir) {
                tracing::error!("[watcher] {e}");
                return Err(e);
            }
            crate::debug_event!("watcher", "watching", "{}", dir.display());
        }

        crate::log_event!(
            "watcher",
            "monitoring",
            "{} directories under {}",
            self.router.watched_dir_count(),
            self.router.root().display()
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    crate::log_event!("watcher", "stopped");
                    return Ok(());
                }

                received = self.event_rx.recv() => {
                    match received {
                        Some(Ok(event)) => self.dispatch(&event),
                        Some(Err(e)) => {
                            tracing::error!("[watcher] file watch error: {e}");
                        }
                        None => {
                            crate::log_event!("watcher", "event channel closed");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, event: &Event) {
        let outcome = self.router.handle_event(event);

        for dir in &outcome.new_directories {
            match self.backend.watch_dir(dir) {
                Ok(()) => crate::debug_event!("watcher", "watching", "{}", dir.display()),
                Err(e) => tracing::warn!("[watcher] {e}"),
            }
        }

        for dir in &outcome.removed_directories {
            // The OS usually drops the watch with the directory.
            if let Err(e) = self.backend.unwatch_dir(dir) {
                crate::debug_event!("watcher", "unwatch skipped", "{e}");
            }
        }
    }
}

/// Builder for constructing a WikiWatcher.
pub struct WikiWatcherBuilder {
    index: Option<Arc<WikiIndex>>,
    sink: Option<Arc<dyn ChangeSink>>,
    debounce_ms: u64,
    channel_capacity: usize,
    cancel: Option<CancellationToken>,
}

impl WikiWatcherBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            index: None,
            sink: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            cancel: None,
        }
    }

    /// Set the index to keep current. Its root is the watched root.
    pub fn index(mut self, index: Arc<WikiIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set where change messages go, usually a `NotificationBroadcaster`.
    pub fn broadcaster(mut self, sink: Arc<dyn ChangeSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Set the debounce duration in milliseconds.
    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Stop the loop when this token is cancelled.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Build the WikiWatcher.
    pub fn build(self) -> WatchResult<WikiWatcher> {
        let index = self.index.ok_or_else(|| WatchError::InitFailed {
            reason: "Index is required".to_string(),
        })?;

        let sink = self.sink.ok_or_else(|| WatchError::InitFailed {
            reason: "Broadcaster is required".to_string(),
        })?;

        // Create channel for events
        let (tx, rx) = mpsc::channel(self.channel_capacity.max(1));

        // Create the notify watcher
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.blocking_send(res);
        })?;

        let router = EventRouter::new(index, sink, self.debounce_ms);

        Ok(WikiWatcher::with_backend(
            router,
            NotifyBackend(watcher),
            rx,
            self.cancel.unwrap_or_else(CancellationToken::new),
        ))
    }
}

impl Default for WikiWatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
