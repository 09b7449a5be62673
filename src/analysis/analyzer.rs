//! Analyzers combine a tokenizer with token filters.
//!
//! - [`pipeline::PipelineAnalyzer`] - tokenizer + ordered filters
//! - [`record::RecordAnalyzer`] - applies an analyzer to documents and queries

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod pipeline;
pub mod record;

/// Trait for analyzers that turn raw text into a token stream.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &str;

    /// Analyze `text` and keep only the token texts.
    fn analyze_terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|token| token.text).collect())
    }
}
