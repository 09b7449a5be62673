//! Type definitions for ranked retrieval results.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A document position paired with its relevance score.
///
/// `score == 0.0` means no query token matched the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    /// Index of the document in the corpus the engine was built from.
    pub doc_index: usize,
    /// BM25 relevance score.
    pub score: f64,
}

impl ScoredMatch {
    pub fn new(doc_index: usize, score: f64) -> Self {
        ScoredMatch { doc_index, score }
    }

    /// Whether at least one query token matched.
    pub fn is_hit(&self) -> bool {
        self.score > 0.0
    }

    /// Descending by score. Used with a stable sort so equal scores keep
    /// corpus order.
    pub fn cmp_by_score_desc(a: &ScoredMatch, b: &ScoredMatch) -> Ordering {
        b.score.total_cmp(&a.score)
    }
}

/// Sort matches by non-increasing score, keeping corpus order among ties.
pub fn rank(matches: &mut [ScoredMatch]) {
    matches.sort_by(ScoredMatch::cmp_by_score_desc);
}
