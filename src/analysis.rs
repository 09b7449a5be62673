//! Text analysis module.
//!
//! Analysis turns raw text into the flat token stream the ranking engine
//! counts. The pipeline is a tokenizer followed by token filters:
//!
//! ```text
//! "Boston  Seafood" -> WhitespaceTokenizer -> LowercaseFilter -> RemoveEmptyFilter
//!                   -> ["boston", "seafood"]
//! ```
//!
//! [`analyzer::RecordAnalyzer`] applies the pipeline either to a multi-field
//! document (field values joined first) or to a free-text query.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
