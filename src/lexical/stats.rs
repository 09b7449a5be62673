//! Corpus statistics and the per-document term-frequency index.
//!
//! Both are produced by a single pass over the documents and never change
//! afterwards, so they can be shared between threads without locking.
//!
//! ```
//! use pulse_rank::analysis::analyzer::record::RecordAnalyzer;
//! use pulse_rank::document::document::Document;
//! use pulse_rank::lexical::stats::CorpusStatistics;
//!
//! let docs = vec![
//!     Document::builder().add_text("city", "Boston").build(),
//!     Document::builder().add_text("city", "Cambridge").build(),
//! ];
//! let analyzer = RecordAnalyzer::new(vec!["city".to_string()]);
//! let (stats, index) = CorpusStatistics::build(&docs, &analyzer).unwrap();
//!
//! assert_eq!(stats.doc_count(), 2);
//! assert_eq!(stats.document_frequency("boston"), 1);
//! assert_eq!(index[1].term_frequency("cambridge"), 1);
//! ```

use ahash::AHashMap;
use log::{debug, info};
use rayon::prelude::*;

use crate::analysis::analyzer::record::RecordAnalyzer;
use crate::document::document::Document;
use crate::error::{PulseRankError, Result};

/// Smoothed BM25 inverse document frequency.
///
/// `ln((N - df + 0.5) / (df + 0.5) + 1)`. Finite and positive for every
/// `df <= N`, and strictly decreasing in `df`.
pub fn bm25_idf(doc_count: u64, document_frequency: u64) -> f64 {
    let n = doc_count as f64;
    let df = document_frequency as f64;
    ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
}

/// Term counts of one document, kept so scoring never re-tokenizes.
#[derive(Debug, Clone, Default)]
pub struct TermFrequencyIndex {
    frequencies: AHashMap<String, u64>,
    length: u64,
}

impl TermFrequencyIndex {
    /// Count the tokens of one document.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut frequencies: AHashMap<String, u64> = AHashMap::with_capacity(tokens.len());
        for token in tokens {
            *frequencies.entry(token.as_ref().to_string()).or_insert(0) += 1;
        }
        TermFrequencyIndex {
            frequencies,
            length: tokens.len() as u64,
        }
    }

    /// Occurrences of `term`, 0 when absent.
    pub fn term_frequency(&self, term: &str) -> u64 {
        self.frequencies.get(term).copied().unwrap_or(0)
    }

    /// Document length in tokens (the sum of all term frequencies).
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Number of distinct terms.
    pub fn unique_terms(&self) -> usize {
        self.frequencies.len()
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.frequencies.keys().map(|t| t.as_str())
    }

    pub fn contains(&self, term: &str) -> bool {
        self.frequencies.contains_key(term)
    }
}

/// Collection-wide statistics used by BM25.
#[derive(Debug, Clone)]
pub struct CorpusStatistics {
    doc_count: u64,
    total_tokens: u64,
    average_document_length: f64,
    document_frequency: AHashMap<String, u64>,
    inverse_document_frequency: AHashMap<String, f64>,
}

impl CorpusStatistics {
    /// Analyze every document once and build the statistics together with
    /// the term-frequency index (one entry per document, in input order).
    ///
    /// Fails with [`PulseRankError::EmptyCorpus`] when `documents` is empty.
    pub fn build(
        documents: &[Document],
        analyzer: &RecordAnalyzer,
    ) -> Result<(CorpusStatistics, Vec<TermFrequencyIndex>)> {
        if documents.is_empty() {
            return Err(PulseRankError::EmptyCorpus);
        }

        let index = documents
            .par_iter()
            .map(|doc| {
                analyzer
                    .analyze_record(doc)
                    .map(|tokens| TermFrequencyIndex::from_tokens(&tokens))
            })
            .collect::<Result<Vec<_>>>()?;

        let stats = Self::from_term_frequencies(&index)?;
        Ok((stats, index))
    }

    /// Build the statistics from an existing term-frequency index.
    pub fn from_term_frequencies(index: &[TermFrequencyIndex]) -> Result<CorpusStatistics> {
        if index.is_empty() {
            return Err(PulseRankError::EmptyCorpus);
        }

        let mut total_tokens = 0u64;
        let mut document_frequency: AHashMap<String, u64> = AHashMap::new();
        for entry in index {
            total_tokens += entry.length();
            // Each distinct term counts once per document.
            for term in entry.terms() {
                *document_frequency.entry(term.to_string()).or_insert(0) += 1;
            }
        }

        let doc_count = index.len() as u64;
        let average_document_length = total_tokens as f64 / doc_count as f64;
        let inverse_document_frequency = document_frequency
            .iter()
            .map(|(term, &df)| (term.clone(), bm25_idf(doc_count, df)))
            .collect::<AHashMap<_, _>>();

        if total_tokens == 0 {
            debug!("corpus of {doc_count} documents produced no tokens");
        }
        info!(
            "corpus statistics: {} documents, {} terms, avg length {:.2}",
            doc_count,
            document_frequency.len(),
            average_document_length
        );

        Ok(CorpusStatistics {
            doc_count,
            total_tokens,
            average_document_length,
            document_frequency,
            inverse_document_frequency,
        })
    }

    /// Number of documents `N`.
    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }

    /// Total number of tokens in the corpus.
    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    /// Mean token count per document.
    pub fn average_document_length(&self) -> f64 {
        self.average_document_length
    }

    /// Documents containing `term` at least once.
    pub fn document_frequency(&self, term: &str) -> u64 {
        self.document_frequency.get(term).copied().unwrap_or(0)
    }

    /// Inverse document frequency of `term`; 0 for terms never seen.
    pub fn idf(&self, term: &str) -> f64 {
        self.inverse_document_frequency
            .get(term)
            .copied()
            .unwrap_or(0.0)
    }

    /// Number of distinct terms in the corpus.
    pub fn vocabulary_size(&self) -> usize {
        self.document_frequency.len()
    }

    /// Iterate over `(term, idf)` pairs in arbitrary order.
    pub fn idf_entries(&self) -> impl Iterator<Item = (&str, f64)> {
        self.inverse_document_frequency
            .iter()
            .map(|(term, &idf)| (term.as_str(), idf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city_docs(cities: &[&str]) -> Vec<Document> {
        cities
            .iter()
            .map(|c| Document::builder().add_text("city", *c).build())
            .collect()
    }

    fn city_analyzer() -> RecordAnalyzer {
        RecordAnalyzer::new(vec!["city".to_string()])
    }

    #[test]
    fn test_empty_corpus_fails() {
        let err = CorpusStatistics::build(&[], &city_analyzer()).unwrap_err();
        assert!(matches!(err, PulseRankError::EmptyCorpus));

        let err = CorpusStatistics::from_term_frequencies(&[]).unwrap_err();
        assert!(matches!(err, PulseRankError::EmptyCorpus));
    }

    #[test]
    fn test_document_frequency_counts_once_per_document() {
        let docs = city_docs(&["Boston Boston Boston", "Boston", "Cambridge"]);
        let (stats, index) = CorpusStatistics::build(&docs, &city_analyzer()).unwrap();

        assert_eq!(stats.doc_count(), 3);
        assert_eq!(stats.document_frequency("boston"), 2);
        assert_eq!(stats.document_frequency("cambridge"), 1);
        assert_eq!(stats.document_frequency("salem"), 0);
        assert_eq!(index[0].term_frequency("boston"), 3);
        assert_eq!(index[0].length(), 3);
        assert_eq!(index[0].unique_terms(), 1);
    }

    #[test]
    fn test_average_document_length() {
        let docs = city_docs(&["a b c", "d", ""]);
        let (stats, index) = CorpusStatistics::build(&docs, &city_analyzer()).unwrap();

        assert_eq!(stats.total_tokens(), 4);
        assert!((stats.average_document_length() - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(index[2].length(), 0);
    }

    #[test]
    fn test_idf_formula() {
        let docs = city_docs(&["boston", "boston", "cambridge"]);
        let (stats, _) = CorpusStatistics::build(&docs, &city_analyzer()).unwrap();

        let expected = ((3.0 - 2.0 + 0.5) / (2.0 + 0.5) + 1.0f64).ln();
        assert!((stats.idf("boston") - expected).abs() < 1e-12);
        assert_eq!(stats.idf("unknown"), 0.0);
    }

    #[test]
    fn test_idf_finite_positive_and_decreasing() {
        for n in 1..=50u64 {
            let mut previous = f64::INFINITY;
            for df in 0..=n {
                let idf = bm25_idf(n, df);
                assert!(idf.is_finite());
                assert!(idf > 0.0, "idf({n}, {df}) = {idf}");
                assert!(idf < previous, "idf must strictly decrease in df");
                previous = idf;
            }
        }
    }

    #[test]
    fn test_rarer_terms_have_higher_idf() {
        let docs = city_docs(&["common rare", "common", "common", "common other"]);
        let (stats, _) = CorpusStatistics::build(&docs, &city_analyzer()).unwrap();

        assert!(stats.idf("rare") > stats.idf("common"));
        assert_eq!(stats.idf("rare"), stats.idf("other"));
        assert_eq!(stats.vocabulary_size(), 3);
    }

    #[test]
    fn test_term_frequency_index_from_tokens() {
        let entry = TermFrequencyIndex::from_tokens(&["a", "b", "a"]);
        assert_eq!(entry.term_frequency("a"), 2);
        assert_eq!(entry.term_frequency("z"), 0);
        assert!(entry.contains("b"));
        assert_eq!(entry.length(), 3);
    }

    #[test]
    fn test_document_length_matches_term_counts() {
        let tokens: Vec<String> = (0..70_000).map(|i| format!("t{}", i % 7)).collect();
        let entry = TermFrequencyIndex::from_tokens(&tokens);

        // Counted in the same width as the corpus total.
        let length: u64 = entry.length();
        let counted: u64 = entry.terms().map(|t| entry.term_frequency(t)).sum();
        assert_eq!(length, tokens.len() as u64);
        assert_eq!(counted, length);

        let stats = CorpusStatistics::from_term_frequencies(&[entry.clone(), entry]).unwrap();
        assert_eq!(stats.total_tokens(), 2 * length);
    }
}
