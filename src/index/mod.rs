//! In-memory wiki index.
//!
//! [`WikiIndex`] owns the live state and handles rebuilds and incremental
//! updates. Readers get an [`IndexSnapshot`], which never changes once handed
//! out.

pub mod error;
pub mod resolver;
pub mod snapshot;
pub mod store;
pub mod walker;

pub use error::{IndexError, IndexResult};
pub use resolver::{Resolution, Suggestion, filter_by_scope, resolve};
pub use snapshot::IndexSnapshot;
pub use store::{FileUpdate, RebuildStats, WikiIndex};
pub use walker::DocumentWalker;
