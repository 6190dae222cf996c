//! File watcher that keeps the wiki index current.
//!
//! # Architecture
//!
//! ```text
//! notify (one non-recursive watch per directory)
//!         |
//!      mpsc channel
//!         |
//! WikiWatcher event loop
//!         |
//! EventRouter
//!   - classify (create / update / delete)
//!   - Debouncer (leading edge, per path)
//!   - DirectoryRegistry (new and removed directories)
//!         |
//!    +----+-----------+
//!    |                |
//! WikiIndex      ChangeSink (broadcast)
//! ```

mod debouncer;
mod error;
pub mod events;
mod registry;
mod router;
mod unified;

pub use debouncer::Debouncer;
pub use error::{WatchError, WatchResult};
pub use events::{Change, PathChange, classify};
pub use registry::DirectoryRegistry;
pub use router::{EventRouter, RouteOutcome};
pub use unified::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_DEBOUNCE_MS, DirectoryWatch, NotifyBackend, WikiWatcher,
    WikiWatcherBuilder,
};
