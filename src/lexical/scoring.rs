//! Pluggable relevance scoring.
//!
//! The engine scores one `(query, document)` pair at a time through a
//! [`ScoringFunction`]. [`bm25::Bm25ScoringFunction`] is the default;
//! [`CustomScoringFunction`] adapts a closure.

use std::sync::Arc;

use crate::error::Result;
use crate::lexical::config::Bm25Params;
use crate::lexical::stats::{CorpusStatistics, TermFrequencyIndex};

pub mod bm25;

pub use self::bm25::Bm25ScoringFunction;

/// Scoring function trait.
///
/// Implementations must be pure: the same inputs always give the same
/// score, and a document sharing no term with the query scores 0.
pub trait ScoringFunction: Send + Sync + std::fmt::Debug {
    /// Calculate the score of one document.
    ///
    /// # Arguments
    ///
    /// * `query_terms` - Analyzed query tokens, duplicates included
    /// * `document` - Term-frequency index of the document being scored
    /// * `stats` - Corpus-wide statistics
    /// * `params` - BM25 parameters of the engine instance
    fn score(
        &self,
        query_terms: &[String],
        document: &TermFrequencyIndex,
        stats: &CorpusStatistics,
        params: &Bm25Params,
    ) -> Result<f64>;

    /// Get function name.
    fn name(&self) -> &str;

    /// Get function description.
    fn description(&self) -> &str;
}

type ScoreFn = dyn Fn(&[String], &TermFrequencyIndex, &CorpusStatistics, &Bm25Params) -> Result<f64>
    + Send
    + Sync;

/// Scoring function backed by a user closure.
pub struct CustomScoringFunction {
    name: String,
    description: String,
    scorer: Arc<ScoreFn>,
}

impl std::fmt::Debug for CustomScoringFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomScoringFunction")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

impl CustomScoringFunction {
    /// Create a new custom scoring function.
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, scorer: F) -> Self
    where
        F: Fn(&[String], &TermFrequencyIndex, &CorpusStatistics, &Bm25Params) -> Result<f64>
            + Send
            + Sync
            + 'static,
    {
        CustomScoringFunction {
            name: name.into(),
            description: description.into(),
            scorer: Arc::new(scorer),
        }
    }
}

impl ScoringFunction for CustomScoringFunction {
    fn score(
        &self,
        query_terms: &[String],
        document: &TermFrequencyIndex,
        stats: &CorpusStatistics,
        params: &Bm25Params,
    ) -> Result<f64> {
        (self.scorer)(query_terms, document, stats, params)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}
