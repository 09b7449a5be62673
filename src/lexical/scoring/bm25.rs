//! Okapi BM25.

use crate::error::Result;
use crate::lexical::config::Bm25Params;
use crate::lexical::scoring::ScoringFunction;
use crate::lexical::stats::{CorpusStatistics, TermFrequencyIndex};

/// BM25 scoring function implementation.
///
/// For every query token `q` with `tf > 0` in the document:
///
/// ```text
/// idf(q) * tf * (k1 + 1) / (tf + k1 * (1 - b + b * dl / avgdl))
/// ```
///
/// Tokens absent from the document or from the corpus add nothing. A
/// repeated query token is counted once per occurrence.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bm25ScoringFunction;

impl Bm25ScoringFunction {
    /// Contribution of a single term with frequency `tf` in a document of
    /// length `doc_length`.
    pub fn term_weight(
        idf: f64,
        tf: f64,
        doc_length: f64,
        average_document_length: f64,
        params: &Bm25Params,
    ) -> f64 {
        let length_ratio = if average_document_length > 0.0 {
            doc_length / average_document_length
        } else {
            0.0
        };
        let norm = params.k1 * (1.0 - params.b + params.b * length_ratio);
        idf * (tf * (params.k1 + 1.0)) / (tf + norm)
    }
}

impl ScoringFunction for Bm25ScoringFunction {
    fn score(
        &self,
        query_terms: &[String],
        document: &TermFrequencyIndex,
        stats: &CorpusStatistics,
        params: &Bm25Params,
    ) -> Result<f64> {
        let doc_length = document.length() as f64;
        let avg_length = stats.average_document_length();
        let mut total_score = 0.0;

        for term in query_terms {
            let tf = document.term_frequency(term);
            if tf == 0 {
                continue;
            }

            let idf = stats.idf(term);
            if idf == 0.0 {
                continue;
            }

            total_score += Self::term_weight(idf, tf as f64, doc_length, avg_length, params);
        }

        Ok(total_score)
    }

    fn name(&self) -> &str {
        "BM25"
    }

    fn description(&self) -> &str {
        "Best Matching 25 probabilistic ranking function"
    }
}
