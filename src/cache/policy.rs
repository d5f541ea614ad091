//! Hit/miss decision for the semantic cache.
//!
//! One nearest neighbor, one global threshold, no reranking. The comparison
//! is strict `>`: a score exactly equal to the threshold is a miss, favoring
//! precision (never reuse a borderline-similar artifact) over recall. Tests
//! depend on this boundary exactly.

use super::types::ScoredEntry;

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Reuse the stored artifact.
    Hit(String),
    /// Generate a new artifact.
    Miss,
}

/// Classify the best match against the configured similarity threshold.
pub fn decide(best: Option<&ScoredEntry>, threshold: f64) -> Decision {
    match best {
        Some(scored) if scored.score > threshold => {
            Decision::Hit(scored.entry.artifact_ref.clone())
        }
        _ => Decision::Miss,
    }
}
