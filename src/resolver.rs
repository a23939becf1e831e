//! Layered companion lookup: open documents, then the ranked index, then a live search.

use std::path::{Path, PathBuf};

use crate::host::OpenDocuments;
use crate::index::FileIndex;
use crate::paths;
use crate::ranker;
use crate::types::{ResolutionRequest, ResolutionResult};
use crate::workspace::Workspace;

/// Default cap on live-search hits per companion name.
pub const DEFAULT_SEARCH_LIMIT: usize = 1;

/// Borrowed view of everything one resolution needs.
pub struct Resolver<'a> {
    /// Documents the host has open.
    documents: &'a dyn OpenDocuments,
    /// Base-name index of the workspace.
    index: &'a FileIndex,
    /// Maximum live-search hits per name.
    search_limit: usize,
    /// Live-search fallback.
    workspace: &'a dyn Workspace,
}

impl<'a> Resolver<'a> {
    /// Assemble a resolver over the given collaborators.
    pub const fn new(
        index: &'a FileIndex,
        workspace: &'a dyn Workspace,
        documents: &'a dyn OpenDocuments,
        search_limit: usize,
    ) -> Self {
        return Self {
            documents,
            index,
            search_limit,
            workspace,
        };
    }

    /// Resolve the companion for `request`.
    ///
    /// Each name is tried in order against open documents and then the index; the
    /// first hit wins. Only when every name misses both does the live search run,
    /// again name by name.
    pub fn resolve(&self, request: &ResolutionRequest) -> ResolutionResult {
        let reference_dir = paths::directory(&request.active_file);

        for name in &request.companion_names {
            if let Some(path) = self.find_open_document(name) {
                log::debug!("resolve: {name} is already open at {}", path.display());
                return ResolutionResult::Found(path);
            }
            if let Some(result) = self.lookup_index(name, reference_dir) {
                log::debug!("resolve: {name} {} in index", result.label());
                return result;
            }
        }

        return self.live_search(&request.companion_names, reference_dir);
    }

    /// First open document named `name`. No ranking: an open buffer always wins.
    fn find_open_document(&self, name: &str) -> Option<PathBuf> {
        return self
            .documents
            .list_open()
            .into_iter()
            .find(|doc| return paths::base_name(doc) == Some(name));
    }

    /// Search the disk for each name in turn. Failures count as misses.
    fn live_search(&self, names: &[String], near: &Path) -> ResolutionResult {
        for name in names {
            match self.workspace.search(name, near, self.search_limit) {
                Ok(hits) => {
                    if let Some(first) = hits.into_iter().next() {
                        log::debug!("resolve: live search found {}", first.display());
                        return ResolutionResult::Found(first);
                    }
                },
                Err(e) => log::warn!("resolve: live search for {name} failed: {e}"),
            }
        }
        return ResolutionResult::NotFound;
    }

    /// Index step for one name. `None` means the index knows no such file.
    fn lookup_index(&self, name: &str, reference_dir: &Path) -> Option<ResolutionResult> {
        let locations = self.index.lookup(name);
        return match locations.as_slice() {
            [] => None,
            [only] => Some(ResolutionResult::Found(only.clone())),
            _ => {
                let ranked = ranker::rank(reference_dir, &locations);
                if let Some(best) = ranker::unique_closest(&ranked) {
                    Some(ResolutionResult::Found(best.path.clone()))
                } else {
                    Some(ResolutionResult::AmbiguousChoice(
                        ranked.into_iter().map(|c| return c.path).collect(),
                    ))
                }
            },
        };
    }
}
