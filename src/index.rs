//! Base-name index of every matching file in the workspace.
//!
//! The map sits behind `RwLock<Arc<_>>`. Readers clone the `Arc` and never see a
//! write in progress; writers go through `Arc::make_mut`, which copies the map only
//! while a reader still holds the previous snapshot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::Error;
use crate::paths;
use crate::workspace::Workspace;

/// Snapshot type shared between readers.
type Entries = HashMap<String, IndexEntry>;

/// All known locations of one file name.
/// Every location ends in `base_name`; no location appears twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// File name shared by every location.
    pub base_name: String,
    /// Absolute paths in the order they were first seen.
    pub locations: Vec<PathBuf>,
}

impl IndexEntry {
    /// Add a location. Returns `false` if it was already present.
    fn insert(&mut self, path: &Path) -> bool {
        if self.locations.iter().any(|p| return p == path) {
            return false;
        }
        self.locations.push(path.to_path_buf());
        return true;
    }

    /// Drop a location. Returns `false` if it was not present.
    fn remove(&mut self, path: &Path) -> bool {
        let before = self.locations.len();
        self.locations.retain(|p| return p != path);
        return self.locations.len() != before;
    }
}

/// Owned, explicitly constructed index passed to the resolution engine.
#[derive(Debug, Default)]
pub struct FileIndex {
    /// Current snapshot; replaced or copied-on-write by mutations.
    snapshot: RwLock<Arc<Entries>>,
}

impl FileIndex {
    /// Every entry in the current snapshot, sorted by base name.
    pub fn entries(&self) -> Vec<IndexEntry> {
        let snapshot = self.snapshot();
        let mut entries: Vec<IndexEntry> = snapshot.values().cloned().collect();
        entries.sort_by(|a, b| return a.base_name.cmp(&b.base_name));
        return entries;
    }

    /// Add `path` under its base name, creating the entry if needed. Idempotent.
    pub fn insert(&self, path: &Path) -> bool {
        let Some(name) = paths::base_name(path) else {
            log::debug!("index: ignoring path without a file name: {}", path.display());
            return false;
        };
        return self.update(|entries| {
            return entries
                .entry(name.to_string())
                .or_insert_with(|| {
                    return IndexEntry {
                        base_name: name.to_string(),
                        locations: Vec::new(),
                    };
                })
                .insert(path);
        });
    }

    /// True when no file name is indexed.
    pub fn is_empty(&self) -> bool {
        return self.snapshot().is_empty();
    }

    /// Number of distinct file names indexed.
    pub fn len(&self) -> usize {
        return self.snapshot().len();
    }

    /// Current locations for `base_name`, or empty if none are known.
    pub fn lookup(&self, base_name: &str) -> Vec<PathBuf> {
        return self
            .snapshot()
            .get(base_name)
            .map(|e| return e.locations.clone())
            .unwrap_or_default();
    }

    /// Re-enumerate the workspace and swap in a fresh index.
    /// Returns the number of distinct file names after the swap.
    ///
    /// # Errors
    ///
    /// Returns `Error::WorkspaceUnavailable` when there is no root to scan, and
    /// `Error::IndexBuildFailed` when enumeration fails. The current index is kept
    /// untouched in both cases.
    pub fn rebuild(&self, workspace: &dyn Workspace) -> Result<usize, Error> {
        if workspace.roots().is_empty() {
            return Err(Error::WorkspaceUnavailable);
        }
        let files = match workspace.enumerate_files() {
            Ok(files) => files,
            Err(e @ (Error::IndexBuildFailed { .. } | Error::WorkspaceUnavailable)) => return Err(e),
            Err(e) => {
                return Err(Error::IndexBuildFailed {
                    reason: e.to_string(),
                });
            },
        };
        let file_count = files.len();
        self.replace(files);

        let unique = self.len();
        log::info!("index: {unique} unique file names from {file_count} files");
        return Ok(unique);
    }

    /// Remove `path` from its entry; empty entries are dropped. No-op if absent.
    pub fn remove(&self, path: &Path) -> bool {
        let Some(name) = paths::base_name(path) else {
            return false;
        };
        return self.update(|entries| {
            let Some(entry) = entries.get_mut(name) else {
                return false;
            };
            let removed = entry.remove(path);
            if entry.locations.is_empty() {
                entries.remove(name);
            }
            return removed;
        });
    }

    /// Remove every location under `dir`. Returns how many paths were dropped.
    pub fn remove_tree(&self, dir: &Path) -> usize {
        let mut removed = 0_usize;
        self.update(|entries| {
            for entry in entries.values_mut() {
                let before = entry.locations.len();
                entry.locations.retain(|p| return !p.starts_with(dir));
                removed = removed.saturating_add(before.saturating_sub(entry.locations.len()));
            }
            entries.retain(|_, e| return !e.locations.is_empty());
            return removed > 0;
        });
        return removed;
    }

    /// Build a new map from `files` and swap it in as one step.
    pub fn replace<I>(&self, files: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut next = Entries::new();
        for path in files {
            let Some(name) = paths::base_name(&path) else {
                continue;
            };
            next.entry(name.to_string())
                .or_insert_with(|| {
                    return IndexEntry {
                        base_name: name.to_string(),
                        locations: Vec::new(),
                    };
                })
                .insert(&path);
        }
        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(next);
    }

    /// Clone the current snapshot pointer.
    fn snapshot(&self) -> Arc<Entries> {
        return Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner));
    }

    /// Apply a mutation under the write lock, copying the map only if a reader holds it.
    fn update<F>(&self, mutate: F) -> bool
    where
        F: FnOnce(&mut Entries) -> bool,
    {
        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        return mutate(Arc::make_mut(&mut guard));
    }
}
