//! Mapping from raw `notify` events to wiki changes.
//!
//! | notify kind                   | change   |
//! |-------------------------------|----------|
//! | `Create(_)`                   | created  |
//! | `Modify(Name(To))`            | created  |
//! | `Modify(Name(Both))`          | removed (old path), created (new path) |
//! | `Modify(Name(From/Any/Other))`| removed  |
//! | `Modify(Metadata(_))`         | ignored  |
//! | other `Modify(_)`             | modified |
//! | `Remove(_)`                   | removed  |
//! | `Access(_)`, `Any`, `Other`   | ignored  |

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use std::path::Path;

use crate::notifications::FileAction;

/// What happened at one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Created,
    Modified,
    Removed,
}

impl Change {
    pub fn action(self) -> FileAction {
        match self {
            Change::Created => FileAction::Create,
            Change::Modified => FileAction::Update,
            Change::Removed => FileAction::Delete,
        }
    }
}

/// One classified path from an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathChange<'a> {
    pub path: &'a Path,
    pub change: Change,
    /// The event itself says the path is a directory.
    pub folder: bool,
}

/// Classify every path of an event. Ignored kinds yield nothing.
pub fn classify(event: &Event) -> Vec<PathChange<'_>> {
    match event.kind {
        EventKind::Create(kind) => uniform(event, Change::Created, kind == CreateKind::Folder),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            uniform(event, Change::Created, false)
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => event
            .paths
            .iter()
            .enumerate()
            .map(|(i, path)| PathChange {
                path,
                change: if i == 0 {
                    Change::Removed
                } else {
                    Change::Created
                },
                folder: false,
            })
            .collect(),
        EventKind::Modify(ModifyKind::Name(_)) => uniform(event, Change::Removed, false),
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(_) => uniform(event, Change::Modified, false),
        EventKind::Remove(kind) => uniform(event, Change::Removed, kind == RemoveKind::Folder),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

fn uniform(event: &Event, change: Change, folder: bool) -> Vec<PathChange<'_>> {
    event
        .paths
        .iter()
        .map(|path| PathChange {
            path,
            change,
            folder,
        })
        .collect()
}
