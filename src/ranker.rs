//! Proximity ranking of same-named candidates relative to a reference directory.

use std::path::{Path, PathBuf};

use crate::paths;
use crate::types::Candidate;

/// First candidate of `rank`, or `None` for empty input.
///
/// When the minimum distance is shared, this still picks one by input order.
/// Callers that need to detect a tie should use [`unique_closest`] on `rank` output.
/// Part of the ranker's public surface; the resolver itself ranks and checks for ties.
#[allow(dead_code, reason = "only called from tests")]
pub fn closest(reference_dir: &Path, candidates: &[PathBuf]) -> Option<PathBuf> {
    return rank(reference_dir, candidates)
        .into_iter()
        .next()
        .map(|c| return c.path);
}

/// Score every candidate by directory distance and sort ascending.
/// The sort is stable: equally distant candidates keep their input order.
pub fn rank(reference_dir: &Path, candidates: &[PathBuf]) -> Vec<Candidate> {
    let mut ranked: Vec<Candidate> = candidates
        .iter()
        .map(|path| {
            return Candidate {
                distance: paths::directory_distance(reference_dir, paths::directory(path)),
                path: path.clone(),
            };
        })
        .collect();
    ranked.sort_by_key(|c| return c.distance);
    return ranked;
}

/// The first ranked candidate, but only if it is strictly closer than the runner-up.
pub fn unique_closest(ranked: &[Candidate]) -> Option<&Candidate> {
    let first = ranked.first()?;
    return match ranked.get(1) {
        Some(second) if second.distance <= first.distance => None,
        _ => Some(first),
    };
}
