//! Horizon selection: the minimum-cost candidate wins.

use crate::types::{PipelineError, ScoredCandidate};

/// Pick the candidate with the lowest cost.
///
/// On equal cost the earliest candidate (strongest Hough vote) wins.
///
/// # Errors
///
/// Returns [`PipelineError::NoCandidates`] for an empty slice.
pub fn select_best(candidates: &[ScoredCandidate]) -> Result<&ScoredCandidate, PipelineError> {
    candidates
        .iter()
        .reduce(|best, c| if c.cost < best.cost { c } else { best })
        .ok_or(PipelineError::NoCandidates)
}
