//! Lexical ranking over small multi-field documents.
//!
//! The pieces, leaves first:
//!
//! - [`config`] - field list and BM25 parameters for one engine instance
//! - [`stats`] - one pass over the corpus: document frequencies, idf,
//!   average document length and the per-document term-frequency index
//! - [`scoring`] - the BM25 scoring function (pluggable)
//! - [`engine`] - [`engine::Bm25Engine`], ranked retrieval for a query
//! - [`types`] - result types
//!
//! Everything is built once and read-only afterwards; rebuilding means
//! constructing a new engine.

pub mod config;
pub mod engine;
pub mod scoring;
pub mod stats;
pub mod types;
