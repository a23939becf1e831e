//! The toggle entry point: resolve the companion, then open it or ask the user.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Error;
use crate::host::{Chooser, OpenDocuments, Opener};
use crate::index::FileIndex;
use crate::paths;
use crate::resolver::Resolver;
use crate::types::{ResolutionRequest, ResolutionResult, ToggleOutcome};
use crate::workspace::Workspace;

/// Owns the collaborators and the request counter used to drop stale results.
pub struct Toggler {
    /// Prompt for ambiguous results.
    chooser: Box<dyn Chooser>,
    /// Documents checked before the index.
    documents: Arc<dyn OpenDocuments>,
    /// Incremented by every toggle; a result is acted on only if still current.
    generation: AtomicU64,
    /// Shared with the watch updater.
    index: Arc<FileIndex>,
    /// Shows the resolved file.
    opener: Box<dyn Opener>,
    /// Live-search cap per companion name.
    search_limit: usize,
    /// Workspace used for the live-search fallback.
    workspace: Arc<dyn Workspace>,
}

impl Toggler {
    /// Wire a toggler from its collaborators.
    pub fn new(
        index: Arc<FileIndex>,
        workspace: Arc<dyn Workspace>,
        documents: Arc<dyn OpenDocuments>,
        opener: Box<dyn Opener>,
        chooser: Box<dyn Chooser>,
        search_limit: usize,
    ) -> Self {
        return Self {
            chooser,
            documents,
            generation: AtomicU64::new(0),
            index,
            opener,
            search_limit,
            workspace,
        };
    }

    /// Toggle away from `active_file`.
    ///
    /// The result is always returned. It is only acted upon (opened or offered as a
    /// choice) if no newer toggle started while this one was resolving; the
    /// outcome's `opened` says which file, if any, was shown.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedExtension` before any lookup for files that are not
    /// `.c`, `.cpp`, or `.h`, and propagates opener or chooser failures.
    pub fn toggle(&self, active_file: &Path) -> Result<ToggleOutcome, Error> {
        let request = ResolutionRequest {
            active_file: active_file.to_path_buf(),
            companion_names: paths::companion_names(active_file)?,
        };
        let generation = self.generation.fetch_add(1, Ordering::SeqCst).wrapping_add(1);

        let resolver = Resolver::new(
            &self.index,
            self.workspace.as_ref(),
            self.documents.as_ref(),
            self.search_limit,
        );
        let result = resolver.resolve(&request);

        if self.generation.load(Ordering::SeqCst) != generation {
            log::debug!(
                "toggle: discarding stale result for {} ({})",
                active_file.display(),
                result.label()
            );
            return Ok(ToggleOutcome { opened: None, result });
        }

        let opened = self.act_on(&result, &request)?;
        return Ok(ToggleOutcome { opened, result });
    }

    /// Open a found companion, or prompt for one of several. Returns the opened path.
    fn act_on(&self, result: &ResolutionResult, request: &ResolutionRequest) -> Result<Option<PathBuf>, Error> {
        let target = match result {
            ResolutionResult::AmbiguousChoice(options) => {
                let choice = self.chooser.present_choice(options)?;
                if choice.is_none() {
                    log::info!("toggle: selection cancelled");
                }
                choice
            },
            ResolutionResult::Found(path) => Some(path.clone()),
            ResolutionResult::NotFound => {
                log::info!("toggle: no companion for {}", request.active_file.display());
                None
            },
        };
        if let Some(path) = &target {
            self.opener.open(path)?;
        }
        return Ok(target);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock, Weak};

    use super::*;

    use crate::host::SessionDocuments;
    use crate::workspace::tests::StaticWorkspace;

    /// Records every opened path.
    #[derive(Default)]
    struct SpyOpener {
        opened: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl Opener for SpyOpener {
        fn open(&self, path: &Path) -> Result<(), Error> {
            self.opened.lock().unwrap().push(path.to_path_buf());
            return Ok(());
        }
    }

    /// Always picks the option at a fixed position, or cancels.
    struct FixedChooser(Option<usize>);

    impl Chooser for FixedChooser {
        fn present_choice(&self, options: &[PathBuf]) -> Result<Option<PathBuf>, Error> {
            return Ok(self.0.and_then(|i| options.get(i)).cloned());
        }
    }

    /// Starts a second toggle from inside the live search of the first.
    #[derive(Default)]
    struct InterruptingWorkspace {
        toggler: OnceLock<Weak<Toggler>>,
    }

    impl Workspace for InterruptingWorkspace {
        fn enumerate_files(&self) -> Result<Vec<PathBuf>, Error> {
            return Ok(Vec::new());
        }

        fn roots(&self) -> Vec<PathBuf> {
            return Vec::new();
        }

        fn search(&self, name: &str, _near: &Path, _limit: usize) -> Result<Vec<PathBuf>, Error> {
            if let Some(toggler) = self.toggler.get().and_then(Weak::upgrade) {
                toggler.toggle(Path::new("/src/bar.cpp"))?;
            }
            return Ok(vec![PathBuf::from(format!("/w/{name}"))]);
        }
    }

    fn toggler(files: &[&str], pick: Option<usize>) -> (Toggler, Arc<Mutex<Vec<PathBuf>>>) {
        let index = Arc::new(FileIndex::default());
        index.replace(files.iter().map(PathBuf::from));
        let opener = SpyOpener::default();
        let opened = Arc::clone(&opener.opened);
        let toggler = Toggler::new(
            index,
            Arc::new(StaticWorkspace::rootless()),
            Arc::new(SessionDocuments::default()),
            Box::new(opener),
            Box::new(FixedChooser(pick)),
            1,
        );
        return (toggler, opened);
    }

    #[test]
    fn found_companion_is_opened() {
        let (toggler, opened) = toggler(&["/src/foo.cpp", "/src/foo.h"], None);
        let outcome = toggler.toggle(Path::new("/src/foo.cpp")).unwrap();

        assert_eq!(outcome.result, ResolutionResult::Found(PathBuf::from("/src/foo.h")));
        assert_eq!(outcome.opened, Some(PathBuf::from("/src/foo.h")));
        assert_eq!(*opened.lock().unwrap(), vec![PathBuf::from("/src/foo.h")]);
    }

    #[test]
    fn ambiguous_choice_opens_selection() {
        let (toggler, opened) = toggler(&["/a/foo.h", "/b/foo.h"], Some(1));
        let outcome = toggler.toggle(Path::new("/c/foo.cpp")).unwrap();

        assert!(matches!(outcome.result, ResolutionResult::AmbiguousChoice(ref v) if v.len() == 2));
        assert_eq!(outcome.opened, Some(PathBuf::from("/b/foo.h")));
        assert_eq!(*opened.lock().unwrap(), vec![PathBuf::from("/b/foo.h")]);
    }

    #[test]
    fn cancelled_choice_opens_nothing() {
        let (toggler, opened) = toggler(&["/a/foo.h", "/b/foo.h"], None);
        let outcome = toggler.toggle(Path::new("/c/foo.cpp")).unwrap();

        assert!(matches!(outcome.result, ResolutionResult::AmbiguousChoice(_)));
        assert_eq!(outcome.opened, None);
        assert!(opened.lock().unwrap().is_empty());
    }

    #[test]
    fn unsupported_extension_fails_before_lookup() {
        let (toggler, opened) = toggler(&["/src/foo.h"], None);
        let err = toggler.toggle(Path::new("/src/foo.rs")).unwrap_err();

        assert!(matches!(err, Error::UnsupportedExtension { .. }));
        assert!(opened.lock().unwrap().is_empty());
    }

    #[test]
    fn not_found_opens_nothing() {
        let (toggler, opened) = toggler(&["/lib/foo.h"], None);
        let outcome = toggler.toggle(Path::new("/lib/foo.h")).unwrap();

        assert_eq!(outcome.result, ResolutionResult::NotFound);
        assert_eq!(outcome.opened, None);
        assert!(opened.lock().unwrap().is_empty());
    }

    #[test]
    fn newer_toggle_supersedes_pending_one() {
        let index = Arc::new(FileIndex::default());
        index.replace(vec![PathBuf::from("/src/bar.h")]);
        let workspace = Arc::new(InterruptingWorkspace::default());
        let opener = SpyOpener::default();
        let opened = Arc::clone(&opener.opened);
        let toggler = Arc::new(Toggler::new(
            index,
            Arc::clone(&workspace) as Arc<dyn Workspace>,
            Arc::new(SessionDocuments::default()),
            Box::new(opener),
            Box::new(FixedChooser(None)),
            1,
        ));
        workspace.toggler.set(Arc::downgrade(&toggler)).unwrap();

        let outcome = toggler.toggle(Path::new("/src/foo.cpp")).unwrap();

        // The stale result is still reported, but only the newer one was opened.
        assert_eq!(outcome.result, ResolutionResult::Found(PathBuf::from("/w/foo.h")));
        assert_eq!(outcome.opened, None);
        assert_eq!(*opened.lock().unwrap(), vec![PathBuf::from("/src/bar.h")]);
    }
}
