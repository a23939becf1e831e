use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher, GlobSet, GlobSetBuilder};
use walkdir::{DirEntry, WalkDir};

use crate::error::Error;

/// Include/exclude patterns applied to paths relative to a workspace root.
#[derive(Debug, Clone)]
pub struct FileFilter {
    /// Patterns that remove a path even when it is included.
    exclude: GlobSet,
    /// Pattern a file must match to be indexed.
    include: GlobMatcher,
}

impl FileFilter {
    /// Compile the include pattern and the exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns `Error::Glob` if any pattern is malformed.
    pub fn new(include: &str, exclude: &[String]) -> Result<Self, Error> {
        let mut builder = GlobSetBuilder::new();
        for pattern in exclude {
            builder.add(Glob::new(pattern)?);
        }
        return Ok(Self {
            exclude: builder.build()?,
            include: Glob::new(include)?.compile_matcher(),
        });
    }

    /// Whether a file at `relative` should be indexed.
    pub fn accepts(&self, relative: &Path) -> bool {
        return self.include.is_match(relative) && !self.is_excluded(relative);
    }

    /// Whether `relative` falls under an exclude pattern.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        return self.exclude.is_match(relative);
    }

    /// A directory is pruned when anything beneath it would be excluded.
    fn prunes_dir(&self, relative: &Path) -> bool {
        return !relative.as_os_str().is_empty() && self.is_excluded(&relative.join("_"));
    }
}

/// Walk `dir` and collect every file the filter accepts, in file-name order.
/// Patterns are matched against paths relative to `base`, the workspace root
/// that owns `dir`. Unreadable entries below `dir` are logged and skipped.
///
/// # Errors
///
/// Returns `Error::IndexBuildFailed` if `dir` itself cannot be read.
pub fn enumerate(dir: &Path, base: &Path, filter: &FileFilter) -> Result<Vec<PathBuf>, Error> {
    let mut files = Vec::new();

    for entry in walk(dir, base, filter) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(Error::IndexBuildFailed {
                    reason: format!("{}: {e}", dir.display()),
                });
            },
            Err(e) => {
                log::warn!("scan: skipping unreadable entry: {e}");
                continue;
            },
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if filter.accepts(relative_to(base, entry.path())) {
            files.push(entry.into_path());
        }
    }

    log::debug!("scan: {} matching files under {}", files.len(), dir.display());
    return Ok(files);
}

/// Find files named exactly `name` under `root`, stopping after `limit` hits.
/// Only exclude patterns apply; the caller already knows what name it wants.
///
/// # Errors
///
/// Returns `Error::Io` if the root itself cannot be read.
pub fn search(root: &Path, name: &str, filter: &FileFilter, limit: usize) -> Result<Vec<PathBuf>, Error> {
    let mut hits = Vec::new();
    if limit == 0 {
        return Ok(hits);
    }

    for entry in walk(root, root, filter) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(Error::Io(e.into())),
            Err(_) => continue,
        };
        if !entry.file_type().is_file() || entry.file_name().to_str() != Some(name) {
            continue;
        }
        if filter.is_excluded(relative_to(root, entry.path())) {
            continue;
        }
        hits.push(entry.into_path());
        if hits.len() >= limit {
            break;
        }
    }

    return Ok(hits);
}

/// Strip `root` from `path`, falling back to the full path.
fn relative_to<'a>(root: &Path, path: &'a Path) -> &'a Path {
    return path.strip_prefix(root).unwrap_or(path);
}

/// Sorted walk of `dir` that never descends into directories excluded relative to `base`.
fn walk<'a>(
    dir: &'a Path,
    base: &'a Path,
    filter: &'a FileFilter,
) -> impl Iterator<Item = Result<DirEntry, walkdir::Error>> + 'a {
    return WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| {
            return !(e.file_type().is_dir() && filter.prunes_dir(relative_to(base, e.path())));
        });
}
