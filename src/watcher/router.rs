//! Dispatch of classified events to the index and the change sink.
//!
//! The router knows nothing about the OS watcher. It takes `notify` events,
//! applies the debounce gate, updates the index and publishes one
//! `file-changed` message per accepted document change. Directory changes
//! are reported back so the caller can add or drop OS watches.

use notify::Event;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use super::debouncer::Debouncer;
use super::events::{Change, PathChange, classify};
use super::registry::DirectoryRegistry;
use crate::index::WikiIndex;
use crate::index::walker::{self, DocumentWalker};
use crate::notifications::{ChangeSink, FileAction, FileChange};

/// Result of routing one event.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RouteOutcome {
    /// Document changes applied and published, in order.
    pub changes: Vec<FileChange>,
    /// Directories that need an OS watch.
    pub new_directories: Vec<PathBuf>,
    /// Directories that no longer exist.
    pub removed_directories: Vec<PathBuf>,
}

impl RouteOutcome {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
            && self.new_directories.is_empty()
            && self.removed_directories.is_empty()
    }
}

/// Routes filesystem events for one wiki root.
pub struct EventRouter {
    index: Arc<WikiIndex>,
    sink: Arc<dyn ChangeSink>,
    debouncer: Debouncer,
    registry: DirectoryRegistry,
    walker: DocumentWalker,
    root: PathBuf,
    /// Some backends report canonical paths regardless of what was watched.
    canonical_root: Option<PathBuf>,
}

impl EventRouter {
    pub fn new(index: Arc<WikiIndex>, sink: Arc<dyn ChangeSink>, debounce_ms: u64) -> Self {
        let root = index.root().to_path_buf();
        let canonical_root = root.canonicalize().ok().filter(|canonical| *canonical != root);
        let walker = DocumentWalker::new(index.extension());

        Self {
            index,
            sink,
            debouncer: Debouncer::new(debounce_ms),
            registry: DirectoryRegistry::new(),
            walker,
            root,
            canonical_root,
        }
    }

    pub fn index(&self) -> &Arc<WikiIndex> {
        &self.index
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register the root and every directory below it.
    ///
    /// Returns the directories to watch, root first.
    pub fn discover_root(&mut self) -> Vec<PathBuf> {
        self.registry.discover(&self.root)
    }

    pub fn watched_dir_count(&self) -> usize {
        self.registry.dir_count()
    }

    /// Route an event observed now.
    pub fn handle_event(&mut self, event: &Event) -> RouteOutcome {
        self.handle_event_at(event, Instant::now())
    }

    /// Route an event observed at `now`.
    pub fn handle_event_at(&mut self, event: &Event, now: Instant) -> RouteOutcome {
        self.debouncer.prune(now);

        let mut outcome = RouteOutcome::default();
        for path_change in classify(event) {
            self.route(path_change, now, &mut outcome);
        }
        outcome
    }

    fn route(&mut self, path_change: PathChange<'_>, now: Instant, outcome: &mut RouteOutcome) {
        let path = path_change.path;
        let Some(relative) = self.relative(path) else {
            crate::debug_event!("watcher", "outside root", "{}", path.display());
            return;
        };
        if walker::has_hidden_component(&relative) {
            return;
        }

        let mut change = path_change.change;

        if change == Change::Created && (path_change.folder || path.is_dir()) {
            self.directory_created(path, now, outcome);
            return;
        }

        let is_document = walker::has_extension(path, self.index.extension());

        if change == Change::Removed && (path_change.folder || !is_document) {
            self.directory_removed(path, &relative, outcome);
            return;
        }

        if !is_document {
            return;
        }

        // Unpaired renames are reported on both ends; the one that still
        // exists is the new name.
        if change == Change::Removed && path.is_file() {
            change = Change::Created;
        }

        if !self.debouncer.accept_at(path, now) {
            crate::debug_event!(
                "watcher",
                "debounced",
                "{relative} within {}ms",
                self.debouncer.window().as_millis()
            );
            return;
        }

        let action = change.action();
        match change {
            Change::Created | Change::Modified => {
                self.index.update_file(&relative);
            }
            Change::Removed => {
                self.index.remove_file(&relative);
            }
        }

        self.publish(relative, action, outcome);
    }

    fn directory_created(&mut self, dir: &Path, now: Instant, outcome: &mut RouteOutcome) {
        let new_dirs = self.registry.discover(dir);
        if !new_dirs.is_empty() {
            crate::log_event!("watcher", "new directory", "{}", dir.display());
        }
        outcome.new_directories.extend(new_dirs);

        for document in self.walker.walk(dir) {
            let Some(relative) = self.relative(&document) else {
                continue;
            };
            if !self.debouncer.accept_at(&document, now) {
                continue;
            }
            self.index.update_file(&relative);
            self.publish(relative, FileAction::Create, outcome);
        }
    }

    fn directory_removed(&mut self, dir: &Path, relative: &str, outcome: &mut RouteOutcome) {
        outcome
            .removed_directories
            .extend(self.registry.forget_tree(dir));

        for removed in self.index.remove_directory(relative) {
            self.publish(removed, FileAction::Delete, outcome);
        }
    }

    fn publish(&self, relative: String, action: FileAction, outcome: &mut RouteOutcome) {
        crate::log_event!("watcher", action.as_str(), "{relative}");
        let change = FileChange::new(relative, action);
        self.sink.file_changed(change.clone());
        outcome.changes.push(change);
    }

    fn relative(&self, path: &Path) -> Option<String> {
        walker::relative_path(&self.root, path).or_else(|| {
            self.canonical_root
                .as_deref()
                .and_then(|canonical| walker::relative_path(canonical, path))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::EventKind;
    use notify::event::{CreateKind, DataChange, ModifyKind, RemoveKind};
    use parking_lot::Mutex;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<FileChange>>);

    impl ChangeSink for Recorder {
        fn file_changed(&self, change: FileChange) {
            self.0.lock().push(change);
        }
    }

    fn setup() -> (TempDir, Arc<WikiIndex>, Arc<Recorder>, EventRouter) {
        let dir = TempDir::new().unwrap();
        let index = Arc::new(WikiIndex::new(dir.path()));
        index.rebuild().unwrap();
        let recorder = Arc::new(Recorder::default());
        let mut router = EventRouter::new(index.clone(), recorder.clone(), 100);
        router.discover_root();
        (dir, index, recorder, router)
    }

    fn event(kind: EventKind, path: PathBuf) -> Event {
        Event::new(kind).add_path(path)
    }

    fn write_event(path: PathBuf) -> Event {
        event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), path)
    }

    #[test]
    fn test_rapid_writes_dispatch_once() {
        let (dir, index, recorder, mut router) = setup();
        let path = dir.path().join("hp.md");
        fs::write(&path, "---\n---\nHealth").unwrap();

        let t0 = Instant::now();
        router.handle_event_at(&write_event(path.clone()), t0);
        router.handle_event_at(&write_event(path.clone()), t0 + Duration::from_millis(20));

        let changes = recorder.0.lock().clone();
        assert_eq!(changes, vec![FileChange::new("hp.md", FileAction::Update)]);
        assert_eq!(index.lookup("hp").len(), 1);
    }

    #[test]
    fn test_write_after_window_dispatches_again() {
        let (dir, _index, recorder, mut router) = setup();
        let path = dir.path().join("hp.md");
        fs::write(&path, "---\n---\nHealth").unwrap();

        let t0 = Instant::now();
        router.handle_event_at(&write_event(path.clone()), t0);
        router.handle_event_at(&write_event(path), t0 + Duration::from_millis(150));

        assert_eq!(recorder.0.lock().len(), 2);
    }

    #[test]
    fn test_remove_event() {
        let (dir, index, recorder, mut router) = setup();
        let path = dir.path().join("hp.md");
        fs::write(&path, "---\n---\nHealth").unwrap();
        index.update_file("hp.md");

        fs::remove_file(&path).unwrap();
        let outcome = router.handle_event(&event(EventKind::Remove(RemoveKind::File), path));

        assert_eq!(
            outcome.changes,
            vec![FileChange::new("hp.md", FileAction::Delete)]
        );
        assert!(index.lookup("hp").is_empty());
        assert_eq!(recorder.0.lock().len(), 1);
    }

    #[test]
    fn test_non_documents_and_hidden_paths_ignored() {
        let (dir, _index, recorder, mut router) = setup();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join(".obsidian")).unwrap();
        fs::write(dir.path().join(".obsidian/a.md"), "---\n---\nX").unwrap();

        let a = router.handle_event(&write_event(dir.path().join("notes.txt")));
        let b = router.handle_event(&write_event(dir.path().join(".obsidian/a.md")));
        let c = router.handle_event(&write_event(PathBuf::from("/elsewhere/x.md")));

        assert!(a.is_empty() && b.is_empty() && c.is_empty());
        assert!(recorder.0.lock().is_empty());
    }

    #[test]
    fn test_new_directory_is_registered_and_indexed() {
        let (dir, index, recorder, mut router) = setup();
        let sub = dir.path().join("combat");
        fs::create_dir_all(sub.join("skills")).unwrap();
        fs::write(sub.join("hp.md"), "---\n---\nHealth").unwrap();
        fs::write(sub.join("skills/dash.md"), "---\n---\nDash").unwrap();

        let outcome = router.handle_event(&event(
            EventKind::Create(CreateKind::Folder),
            sub.clone(),
        ));

        assert_eq!(outcome.new_directories, vec![sub.clone(), sub.join("skills")]);
        assert_eq!(
            outcome.changes,
            vec![
                FileChange::new("combat/hp.md", FileAction::Create),
                FileChange::new("combat/skills/dash.md", FileAction::Create),
            ]
        );
        assert_eq!(index.lookup("dash").len(), 1);
        assert_eq!(recorder.0.lock().len(), 2);

        // the per-file create that follows is swallowed by the debounce gate
        let again = router.handle_event(&event(
            EventKind::Create(CreateKind::File),
            sub.join("hp.md"),
        ));
        assert!(again.changes.is_empty());
    }

    #[test]
    fn test_removed_directory_drops_its_documents() {
        let (dir, index, _recorder, mut router) = setup();
        let sub = dir.path().join("combat");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("hp.md"), "---\n---\nHealth").unwrap();
        index.rebuild().unwrap();
        router.discover_root();

        fs::remove_dir_all(&sub).unwrap();
        let outcome = router.handle_event(&event(EventKind::Remove(RemoveKind::Any), sub.clone()));

        assert_eq!(outcome.removed_directories, vec![sub]);
        assert_eq!(
            outcome.changes,
            vec![FileChange::new("combat/hp.md", FileAction::Delete)]
        );
        assert!(index.lookup("hp").is_empty());
    }

    #[test]
    fn test_unpaired_rename_onto_existing_file_is_create() {
        let (dir, index, _recorder, mut router) = setup();
        let path = dir.path().join("moved.md");
        fs::write(&path, "---\n---\nMoved here").unwrap();

        let outcome = router.handle_event(&event(
            EventKind::Modify(ModifyKind::Name(notify::event::RenameMode::Any)),
            path,
        ));

        assert_eq!(
            outcome.changes,
            vec![FileChange::new("moved.md", FileAction::Create)]
        );
        assert_eq!(index.lookup("moved").len(), 1);
    }
}
