//! File watcher: turns notify events into create/delete notifications for the index.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{RecursiveMode, Watcher as _};

use crate::error::Error;
use crate::index::FileIndex;
use crate::workspace::FsWorkspace;

/// A change to one path, as far as the index cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// Contents changed. The index ignores these.
    Changed(PathBuf),
    /// A file or directory appeared.
    Created(PathBuf),
    /// A file or directory disappeared.
    Deleted(PathBuf),
}

/// Recursive watcher over the workspace roots, feeding a channel of `FileEvent`s.
pub struct FileWatcher {
    /// Receiving end handed to the index updater.
    events: crossbeam_channel::Receiver<FileEvent>,
    /// Kept alive for as long as events should flow.
    watcher: notify::RecommendedWatcher,
}

impl FileWatcher {
    /// A receiver for the event stream. Disconnects when the watcher is dropped.
    pub fn events(&self) -> crossbeam_channel::Receiver<FileEvent> {
        return self.events.clone();
    }

    /// Create a watcher and attach it to every root.
    ///
    /// # Errors
    ///
    /// Returns `Error::Watch` if the watcher cannot be created or a root cannot be watched.
    pub fn start(roots: &[PathBuf]) -> Result<Self, Error> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
            match res {
                Ok(event) => {
                    for change in translate(&event) {
                        let _ = tx.send(change);
                    }
                },
                Err(e) => log::warn!("watch: {e}"),
            }
        })?;

        let mut file_watcher = Self {
            events: rx,
            watcher,
        };
        for root in roots {
            file_watcher.watch(root)?;
        }
        return Ok(file_watcher);
    }

    /// Start watching another root recursively.
    ///
    /// # Errors
    ///
    /// Returns `Error::Watch` if notify rejects the path.
    pub fn watch(&mut self, root: &Path) -> Result<(), Error> {
        self.watcher.watch(root, RecursiveMode::Recursive)?;
        log::debug!("watch: monitoring {}", root.display());
        return Ok(());
    }
}

/// Apply one event to the index. Returns `true` if the index changed.
pub fn apply(index: &FileIndex, workspace: &FsWorkspace, event: &FileEvent) -> bool {
    return match event {
        FileEvent::Changed(_) => false,
        FileEvent::Created(path) if path.is_dir() => {
            match workspace.files_under(path) {
                Ok(files) => files.iter().fold(false, |changed, file| {
                    return index.insert(file) || changed;
                }),
                Err(e) => {
                    log::warn!("watch: cannot scan new directory {}: {e}", path.display());
                    false
                },
            }
        },
        FileEvent::Created(path) => {
            workspace.accepts(path) && index.insert(path)
        },
        // A deleted directory can still look like a source file by name.
        FileEvent::Deleted(path) => {
            (workspace.accepts(path) && index.remove(path)) || index.remove_tree(path) > 0
        },
    };
}

/// Consume `events` on a background thread until the channel disconnects.
/// The thread returns the number of events that changed the index.
pub fn spawn_updater(
    index: Arc<FileIndex>,
    workspace: Arc<FsWorkspace>,
    events: crossbeam_channel::Receiver<FileEvent>,
) -> JoinHandle<usize> {
    return std::thread::spawn(move || {
        let mut applied = 0_usize;
        while let Ok(event) = events.recv() {
            if apply(&index, &workspace, &event) {
                log::debug!("watch: applied {event:?}");
                applied = applied.saturating_add(1);
            }
        }
        return applied;
    });
}

/// Map a notify event to the changes the index understands.
fn translate(event: &notify::Event) -> Vec<FileEvent> {
    let paths = event.paths.iter().cloned();
    return match event.kind {
        EventKind::Create(_) => paths.map(FileEvent::Created).collect(),
        EventKind::Remove(_) => paths.map(FileEvent::Deleted).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => paths.map(FileEvent::Deleted).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => paths.map(FileEvent::Created).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut changes = Vec::new();
            if let Some(from) = event.paths.first() {
                changes.push(FileEvent::Deleted(from.clone()));
            }
            if let Some(to) = event.paths.get(1) {
                changes.push(FileEvent::Created(to.clone()));
            }
            changes
        },
        // Platforms that cannot tell the two sides of a rename apart.
        EventKind::Modify(ModifyKind::Name(_)) => paths
            .map(|p| {
                return if p.exists() {
                    FileEvent::Created(p)
                } else {
                    FileEvent::Deleted(p)
                };
            })
            .collect(),
        EventKind::Modify(_) => paths.map(FileEvent::Changed).collect(),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::scanner::FileFilter;

    fn workspace(root: &Path) -> FsWorkspace {
        let filter = FileFilter::new("**/*.{c,cpp,h}", &["**/node_modules/**".to_string()]).unwrap();
        return FsWorkspace::new(vec![root.to_path_buf()], filter);
    }

    #[test]
    fn translates_creates_removes_and_renames() {
        let create = notify::Event::new(EventKind::Create(notify::event::CreateKind::File))
            .add_path(PathBuf::from("/w/a.h"));
        assert_eq!(translate(&create), vec![FileEvent::Created(PathBuf::from("/w/a.h"))]);

        let remove = notify::Event::new(EventKind::Remove(notify::event::RemoveKind::File))
            .add_path(PathBuf::from("/w/a.h"));
        assert_eq!(translate(&remove), vec![FileEvent::Deleted(PathBuf::from("/w/a.h"))]);

        let rename = notify::Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/w/old.h"))
            .add_path(PathBuf::from("/w/new.h"));
        assert_eq!(
            translate(&rename),
            vec![
                FileEvent::Deleted(PathBuf::from("/w/old.h")),
                FileEvent::Created(PathBuf::from("/w/new.h")),
            ]
        );

        let write = notify::Event::new(EventKind::Modify(ModifyKind::Data(notify::event::DataChange::Content)))
            .add_path(PathBuf::from("/w/a.h"));
        assert_eq!(translate(&write), vec![FileEvent::Changed(PathBuf::from("/w/a.h"))]);
    }

    #[test]
    fn created_and_deleted_files_update_index() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let index = FileIndex::default();
        let header = dir.path().join("src/foo.h");

        assert!(apply(&index, &ws, &FileEvent::Created(header.clone())));
        assert_eq!(index.lookup("foo.h"), vec![header.clone()]);

        assert!(!apply(&index, &ws, &FileEvent::Changed(header.clone())));
        assert!(apply(&index, &ws, &FileEvent::Deleted(header)));
        assert!(index.lookup("foo.h").is_empty());
    }

    #[test]
    fn ignores_files_outside_the_filter() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let index = FileIndex::default();

        assert!(!apply(&index, &ws, &FileEvent::Created(dir.path().join("notes.md"))));
        assert!(!apply(&index, &ws, &FileEvent::Created(dir.path().join("node_modules/x/foo.h"))));
        assert!(index.is_empty());
    }

    #[test]
    fn deleted_directory_drops_its_files() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let index = FileIndex::default();
        index.insert(&dir.path().join("vendor/foo.h"));
        index.insert(&dir.path().join("vendor/deep/bar.c"));
        index.insert(&dir.path().join("src/foo.h"));

        assert!(apply(&index, &ws, &FileEvent::Deleted(dir.path().join("vendor"))));
        assert_eq!(index.lookup("foo.h"), vec![dir.path().join("src/foo.h")]);
        assert!(index.lookup("bar.c").is_empty());
    }

    #[test]
    fn created_directory_is_scanned() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let index = FileIndex::default();
        let moved_in = dir.path().join("lib");
        std::fs::create_dir_all(&moved_in).unwrap();
        std::fs::write(moved_in.join("foo.c"), "").unwrap();
        std::fs::write(moved_in.join("README"), "").unwrap();

        assert!(apply(&index, &ws, &FileEvent::Created(moved_in.clone())));
        assert_eq!(index.lookup("foo.c"), vec![moved_in.join("foo.c")]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn created_directory_honors_root_anchored_include() {
        let dir = tempfile::tempdir().unwrap();
        let filter = FileFilter::new("src/**/*.h", &[]).unwrap();
        let ws = FsWorkspace::new(vec![dir.path().to_path_buf()], filter);
        let index = FileIndex::default();
        let created = dir.path().join("src/new");
        std::fs::create_dir_all(&created).unwrap();
        std::fs::write(created.join("foo.h"), "").unwrap();
        std::fs::write(created.join("foo.c"), "").unwrap();

        assert!(ws.accepts(&created.join("foo.h")));
        assert!(apply(&index, &ws, &FileEvent::Created(created.clone())));
        assert_eq!(index.lookup("foo.h"), vec![created.join("foo.h")]);
        assert!(index.lookup("foo.c").is_empty());
    }

    #[test]
    fn deleted_directory_named_like_a_header_drops_its_files() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let index = FileIndex::default();
        let generated = dir.path().join("gen.h");
        index.insert(&generated.join("foo.h"));
        index.insert(&dir.path().join("src/bar.c"));

        assert!(apply(&index, &ws, &FileEvent::Deleted(generated)));
        assert!(index.lookup("foo.h").is_empty());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn updater_drains_channel_until_disconnect() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Arc::new(workspace(dir.path()));
        let index = Arc::new(FileIndex::default());
        let (tx, rx) = crossbeam_channel::unbounded();

        let handle = spawn_updater(Arc::clone(&index), ws, rx);
        tx.send(FileEvent::Created(dir.path().join("a.h"))).unwrap();
        tx.send(FileEvent::Created(dir.path().join("b.c"))).unwrap();
        tx.send(FileEvent::Deleted(dir.path().join("a.h"))).unwrap();
        drop(tx);

        assert_eq!(handle.join().unwrap(), 3);
        assert_eq!(index.lookup("b.c"), vec![dir.path().join("b.c")]);
        assert!(index.lookup("a.h").is_empty());
    }
}
