//! Workspace collaborator: root folders, full enumeration, and live search.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::error::Error;
use crate::scanner::{self, FileFilter};

/// Where companion files live. The index enumerates through this trait and the
/// resolver falls back to its live search.
pub trait Workspace: Send + Sync {
    /// Every matching file in every root.
    ///
    /// # Errors
    ///
    /// Returns `Error::WorkspaceUnavailable` with no roots, or
    /// `Error::IndexBuildFailed` when a root cannot be enumerated.
    fn enumerate_files(&self) -> Result<Vec<PathBuf>, Error>;

    /// Current workspace folders.
    fn roots(&self) -> Vec<PathBuf>;

    /// Look for files named `name` on disk, returning at most `limit` hits.
    /// `near` is the active file's directory, searched when there are no roots.
    ///
    /// # Errors
    ///
    /// Returns filesystem errors from the search.
    fn search(&self, name: &str, near: &Path, limit: usize) -> Result<Vec<PathBuf>, Error>;
}

/// Filesystem-backed workspace over one or more absolute root folders.
#[derive(Debug)]
pub struct FsWorkspace {
    /// Include/exclude patterns shared by enumeration, search, and event filtering.
    filter: FileFilter,
    /// Workspace folders; grows when the session adds a root.
    roots: RwLock<Vec<PathBuf>>,
}

impl FsWorkspace {
    /// Whether `path` is a file this workspace would index.
    pub fn accepts(&self, path: &Path) -> bool {
        return self
            .owning_root(path)
            .is_some_and(|root| return self.filter.accepts(path.strip_prefix(&root).unwrap_or(path)));
    }

    /// Add a workspace folder. Returns `false` if it was already present.
    pub fn add_root(&self, root: PathBuf) -> bool {
        let mut roots = self.roots.write().unwrap_or_else(PoisonError::into_inner);
        if roots.contains(&root) {
            return false;
        }
        roots.push(root);
        return true;
    }

    /// Matching files under `dir`, which must sit inside one of the roots.
    /// Used when a whole directory appears at once.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexBuildFailed` if `dir` cannot be read.
    pub fn files_under(&self, dir: &Path) -> Result<Vec<PathBuf>, Error> {
        let Some(root) = self.owning_root(dir) else {
            return Ok(Vec::new());
        };
        return scanner::enumerate(dir, &root, &self.filter);
    }

    /// Create a workspace over `roots` filtered by `filter`.
    pub const fn new(roots: Vec<PathBuf>, filter: FileFilter) -> Self {
        return Self {
            filter,
            roots: RwLock::new(roots),
        };
    }

    /// The deepest root containing `path`.
    fn owning_root(&self, path: &Path) -> Option<PathBuf> {
        return self
            .roots()
            .into_iter()
            .filter(|root| return path.starts_with(root))
            .max_by_key(|root| return root.components().count());
    }
}

impl Workspace for FsWorkspace {
    fn enumerate_files(&self) -> Result<Vec<PathBuf>, Error> {
        let roots = self.roots();
        if roots.is_empty() {
            return Err(Error::WorkspaceUnavailable);
        }
        let mut files = Vec::new();
        for root in &roots {
            files.extend(scanner::enumerate(root, root, &self.filter)?);
        }
        return Ok(files);
    }

    fn roots(&self) -> Vec<PathBuf> {
        return self.roots.read().unwrap_or_else(PoisonError::into_inner).clone();
    }

    fn search(&self, name: &str, near: &Path, limit: usize) -> Result<Vec<PathBuf>, Error> {
        let roots = self.roots();
        if roots.is_empty() {
            log::debug!("search: no workspace roots, searching {}", near.display());
            return scanner::search(near, name, &self.filter, limit);
        }

        let mut hits = Vec::new();
        for root in &roots {
            let remaining = limit.saturating_sub(hits.len());
            if remaining == 0 {
                break;
            }
            hits.extend(scanner::search(root, name, &self.filter, remaining)?);
        }
        return Ok(hits);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// In-memory workspace for index and resolver tests.
    pub(crate) struct StaticWorkspace {
        /// Files returned by enumeration, in order.
        files: Vec<PathBuf>,
        /// Whether enumeration and search fail.
        failing: bool,
        /// Reported roots.
        roots: Vec<PathBuf>,
    }

    impl StaticWorkspace {
        pub(crate) fn failing() -> Self {
            return Self {
                files: Vec::new(),
                failing: true,
                roots: vec![PathBuf::from("/w")],
            };
        }

        pub(crate) fn new(files: &[&str]) -> Self {
            return Self {
                files: files.iter().map(PathBuf::from).collect(),
                failing: false,
                roots: vec![PathBuf::from("/w")],
            };
        }

        pub(crate) fn rootless() -> Self {
            return Self {
                files: Vec::new(),
                failing: false,
                roots: Vec::new(),
            };
        }
    }

    impl Workspace for StaticWorkspace {
        fn enumerate_files(&self) -> Result<Vec<PathBuf>, Error> {
            if self.failing {
                return Err(Error::Io(std::io::Error::other("disk on fire")));
            }
            return Ok(self.files.clone());
        }

        fn roots(&self) -> Vec<PathBuf> {
            return self.roots.clone();
        }

        fn search(&self, name: &str, _near: &Path, limit: usize) -> Result<Vec<PathBuf>, Error> {
            if self.failing {
                return Err(Error::Io(std::io::Error::other("search failed")));
            }
            return Ok(self
                .files
                .iter()
                .filter(|p| p.file_name().and_then(|n| n.to_str()) == Some(name))
                .take(limit)
                .cloned()
                .collect());
        }
    }

    fn filter() -> FileFilter {
        return FileFilter::new("**/*.{c,cpp,h}", &["**/build/**".to_string()]).unwrap();
    }

    #[test]
    fn accepts_only_files_inside_roots() {
        let workspace = FsWorkspace::new(vec![PathBuf::from("/w")], filter());
        assert!(workspace.accepts(Path::new("/w/src/foo.h")));
        assert!(!workspace.accepts(Path::new("/elsewhere/foo.h")));
        assert!(!workspace.accepts(Path::new("/w/build/foo.h")));
        assert!(!workspace.accepts(Path::new("/w/src/foo.txt")));
    }

    #[test]
    fn add_root_ignores_duplicates() {
        let workspace = FsWorkspace::new(vec![PathBuf::from("/w")], filter());
        assert!(!workspace.add_root(PathBuf::from("/w")));
        assert!(workspace.add_root(PathBuf::from("/v")));
        assert_eq!(workspace.roots().len(), 2);
    }

    #[test]
    fn enumerates_all_roots_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(first.path().join("a.h"), "").unwrap();
        std::fs::write(second.path().join("b.c"), "").unwrap();

        let workspace = FsWorkspace::new(
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
            filter(),
        );
        let files = workspace.enumerate_files().unwrap();
        assert_eq!(files, vec![first.path().join("a.h"), second.path().join("b.c")]);
    }

    #[test]
    fn rootless_search_looks_near_active_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("foo.h"), "").unwrap();

        let workspace = FsWorkspace::new(Vec::new(), filter());
        assert!(matches!(workspace.enumerate_files(), Err(Error::WorkspaceUnavailable)));

        let hits = workspace.search("foo.h", dir.path(), 1).unwrap();
        assert_eq!(hits, vec![dir.path().join("foo.h")]);
    }
}
