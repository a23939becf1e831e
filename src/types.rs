/// Core domain types for companion resolution requests and results.
use std::path::PathBuf;

/// A candidate path scored against a reference directory by the ranker.
/// Lives only for the duration of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Segment distance between the candidate's directory and the reference directory.
    pub distance: usize,
    /// Absolute path of the candidate file.
    pub path: PathBuf,
}

/// What the resolution engine is asked to find.
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    /// The file the user is currently looking at.
    pub active_file: PathBuf,
    /// Companion file names to try, in strict order (one or two entries).
    pub companion_names: Vec<String>,
}

/// Outcome of one resolution. Neither ambiguity nor absence is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    /// Several equally good candidates; the caller must ask the user.
    AmbiguousChoice(
        /// Candidates in ranked order.
        Vec<PathBuf>,
    ),
    /// A single best companion was found.
    Found(
        /// Path of the companion to open.
        PathBuf,
    ),
    /// No companion exists anywhere the engine looked.
    NotFound,
}

impl ResolutionResult {
    /// Short label used in log lines and command output.
    pub const fn label(&self) -> &'static str {
        return match self {
            ResolutionResult::AmbiguousChoice(_) => "ambiguous",
            ResolutionResult::Found(_) => "found",
            ResolutionResult::NotFound => "not found",
        };
    }
}

/// What one toggle resolved to, and what it ended up opening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// The file handed to the opener. `None` when nothing was found, the
    /// selection was cancelled, or a newer toggle superseded this one.
    pub opened: Option<PathBuf>,
    /// The resolution, reported even when it was not acted on.
    pub result: ResolutionResult,
}
