//! Change notifications for connected clients.
//!
//! The watcher and the server publish [`WsMessage`]s through a
//! [`NotificationBroadcaster`]. Messages are serialized once on send and
//! fanned out as shared JSON text, so every subscriber gets the same frame.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::index::IndexSnapshot;

/// What happened to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
    Create,
    Update,
    Delete,
}

impl FileAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileAction::Create => "create",
            FileAction::Update => "update",
            FileAction::Delete => "delete",
        }
    }
}

/// Payload of a `file-changed` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path relative to the wiki root, `/`-separated.
    pub path: String,
    pub action: FileAction,
}

impl FileChange {
    pub fn new(path: impl Into<String>, action: FileAction) -> Self {
        Self {
            path: path.into(),
            action,
        }
    }
}

/// Messages exchanged over the websocket: `{"type": ..., "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum WsMessage {
    /// A document was created, modified or deleted.
    FileChanged(FileChange),
    /// A full rebuild finished; carries the new index.
    IndexUpdated(Arc<IndexSnapshot>),
    /// Client request for a full rebuild.
    RefreshIndex,
}

/// Anything that accepts file change notifications.
///
/// The watcher only needs this much; tests can record changes instead of
/// broadcasting them.
pub trait ChangeSink: Send + Sync {
    fn file_changed(&self, change: FileChange);
}

/// Fans messages out to every subscriber.
#[derive(Debug, Clone)]
pub struct NotificationBroadcaster {
    sender: broadcast::Sender<Arc<str>>,
}

impl NotificationBroadcaster {
    /// Create a new broadcaster with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Serialize and send a message. Returns the number of subscribers reached.
    pub fn send(&self, message: &WsMessage) -> usize {
        let text: Arc<str> = match serde_json::to_string(message) {
            Ok(text) => text.into(),
            Err(e) => {
                tracing::warn!("[broadcast] failed to serialize message: {e}");
                return 0;
            }
        };

        match self.sender.send(text) {
            Ok(count) => {
                crate::debug_event!(
                    "broadcast",
                    "sent",
                    "{} to {count} subscribers",
                    kind(message)
                );
                count
            }
            Err(_) => {
                // No receivers, this is fine
                crate::debug_event!(
                    "broadcast",
                    "dropped",
                    "no subscribers for {}",
                    kind(message)
                );
                0
            }
        }
    }

    /// Subscribe to receive serialized messages.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<str>> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl ChangeSink for NotificationBroadcaster {
    fn file_changed(&self, change: FileChange) {
        self.send(&WsMessage::FileChanged(change));
    }
}

fn kind(message: &WsMessage) -> String {
    match message {
        WsMessage::FileChanged(change) => {
            format!("{} {}", change.action.as_str(), change.path)
        }
        WsMessage::IndexUpdated(_) => "index-updated".to_string(),
        WsMessage::RefreshIndex => "refresh-index".to_string(),
    }
}
