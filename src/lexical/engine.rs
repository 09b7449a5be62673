//! BM25 retrieval engine.
//!
//! An engine is built once from a document collection and is read-only
//! afterwards; rebuilding means constructing a new engine. Several engines
//! can coexist since all state lives in the instance.
//!
//! # Example
//!
//! ```
//! use pulse_rank::document::document::Document;
//! use pulse_rank::lexical::config::SearchConfig;
//! use pulse_rank::lexical::engine::Bm25Engine;
//!
//! let docs = vec![
//!     Document::builder().add_text("city", "Boston").build(),
//!     Document::builder().add_text("city", "Cambridge").build(),
//! ];
//! let engine = Bm25Engine::build(&docs, SearchConfig::new(["city"])).unwrap();
//!
//! let hits = engine.search_hits("boston").unwrap();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].doc_index, 0);
//! ```

use std::sync::Arc;

use log::{debug, info};
use rayon::prelude::*;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::record::RecordAnalyzer;
use crate::document::document::Document;
use crate::error::{PulseRankError, Result};
use crate::lexical::config::SearchConfig;
use crate::lexical::scoring::{Bm25ScoringFunction, ScoringFunction};
use crate::lexical::stats::{CorpusStatistics, TermFrequencyIndex};
use crate::lexical::types::{ScoredMatch, rank};

/// Ranked retrieval over an immutable document collection.
#[derive(Debug, Clone)]
pub struct Bm25Engine {
    /// Configuration the engine was built with.
    config: SearchConfig,

    /// Document and query analysis.
    analyzer: RecordAnalyzer,

    /// Corpus-wide statistics.
    stats: CorpusStatistics,

    /// One entry per document, in corpus order.
    term_frequencies: Vec<TermFrequencyIndex>,

    scoring_function: Arc<dyn ScoringFunction>,
}

impl Bm25Engine {
    /// Build an engine with the default whitespace + lowercase analysis.
    pub fn build(documents: &[Document], config: SearchConfig) -> Result<Self> {
        let analyzer = RecordAnalyzer::new(config.fields.clone());
        Self::build_inner(documents, config, analyzer)
    }

    /// Build an engine analyzing documents and queries with `analyzer`.
    pub fn build_with_analyzer(
        documents: &[Document],
        config: SearchConfig,
        analyzer: Arc<dyn Analyzer>,
    ) -> Result<Self> {
        let analyzer = RecordAnalyzer::with_analyzer(analyzer, config.fields.clone());
        Self::build_inner(documents, config, analyzer)
    }

    fn build_inner(
        documents: &[Document],
        config: SearchConfig,
        analyzer: RecordAnalyzer,
    ) -> Result<Self> {
        config.validate()?;
        let (stats, term_frequencies) = CorpusStatistics::build(documents, &analyzer)?;

        info!(
            "built BM25 engine over {} documents (fields: {}, k1={}, b={})",
            term_frequencies.len(),
            config.fields.join(","),
            config.bm25.k1,
            config.bm25.b
        );

        Ok(Bm25Engine {
            config,
            analyzer,
            stats,
            term_frequencies,
            scoring_function: Arc::new(Bm25ScoringFunction),
        })
    }

    /// Replace the scoring function.
    pub fn with_scoring_function(mut self, scoring_function: Arc<dyn ScoringFunction>) -> Self {
        self.scoring_function = scoring_function;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn stats(&self) -> &CorpusStatistics {
        &self.stats
    }

    pub fn analyzer(&self) -> &RecordAnalyzer {
        &self.analyzer
    }

    pub fn scoring_function(&self) -> &Arc<dyn ScoringFunction> {
        &self.scoring_function
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.term_frequencies.len()
    }

    /// Always false: building over zero documents fails.
    pub fn is_empty(&self) -> bool {
        self.term_frequencies.is_empty()
    }

    /// Token count of the document at `doc_index`.
    pub fn document_length(&self, doc_index: usize) -> Option<u64> {
        self.term_frequencies.get(doc_index).map(|tf| tf.length())
    }

    /// Cached term frequencies of the document at `doc_index`.
    pub fn term_frequencies(&self, doc_index: usize) -> Option<&TermFrequencyIndex> {
        self.term_frequencies.get(doc_index)
    }

    /// Tokenize a free-text query with the document analysis rules.
    pub fn tokenize_query(&self, query: &str) -> Result<Vec<String>> {
        self.analyzer.analyze_query(query)
    }

    /// Score already tokenized `query_terms` against one document.
    pub fn score_tokens(&self, query_terms: &[String], doc_index: usize) -> Result<f64> {
        let document = self.term_frequencies.get(doc_index).ok_or_else(|| {
            PulseRankError::invalid_argument(format!(
                "document index {doc_index} out of range (corpus has {} documents)",
                self.len()
            ))
        })?;
        self.scoring_function
            .score(query_terms, document, &self.stats, &self.config.bm25)
    }

    /// Score a free-text query against one document.
    pub fn score(&self, query: &str, doc_index: usize) -> Result<f64> {
        let terms = self.tokenize_query(query)?;
        self.score_tokens(&terms, doc_index)
    }

    /// Rank every document for `query_terms`, zero scores included.
    ///
    /// Sorted by non-increasing score; equal scores keep corpus order.
    pub fn search_tokens(&self, query_terms: &[String]) -> Result<Vec<ScoredMatch>> {
        let mut matches = self
            .term_frequencies
            .par_iter()
            .enumerate()
            .map(|(doc_index, document)| {
                self.scoring_function
                    .score(query_terms, document, &self.stats, &self.config.bm25)
                    .map(|score| ScoredMatch::new(doc_index, score))
            })
            .collect::<Result<Vec<_>>>()?;

        rank(&mut matches);

        debug!(
            "scored {} documents for {} query terms",
            matches.len(),
            query_terms.len()
        );
        Ok(matches)
    }

    /// Rank every document for a free-text query, zero scores included.
    pub fn search(&self, query: &str) -> Result<Vec<ScoredMatch>> {
        let terms = self.tokenize_query(query)?;
        self.search_tokens(&terms)
    }

    /// Rank only the documents matching at least one query token.
    pub fn search_hits(&self, query: &str) -> Result<Vec<ScoredMatch>> {
        let mut matches = self.search(query)?;
        matches.retain(ScoredMatch::is_hit);
        Ok(matches)
    }

    /// The `k` best matching documents.
    pub fn top_k(&self, query: &str, k: usize) -> Result<Vec<ScoredMatch>> {
        let mut hits = self.search_hits(query)?;
        hits.truncate(k);
        Ok(hits)
    }
}
