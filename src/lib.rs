pub mod cli;
pub mod config;
pub mod files;
pub mod index;
pub mod logging;
pub mod notifications;
pub mod parsing;
pub mod server;
pub mod utils;
pub mod watcher;

pub use config::Settings;
pub use files::{FileTreeNode, build_file_tree};
pub use index::{IndexSnapshot, Resolution, WikiIndex, resolve};
pub use notifications::{ChangeSink, FileAction, FileChange, NotificationBroadcaster, WsMessage};
pub use parsing::{Formula, ParsedDocument, Term, WikiParser, parse_document};
pub use watcher::{EventRouter, WikiWatcher};
