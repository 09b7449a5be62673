//! # pulse-rank
//!
//! BM25 ranking over small multi-field documents, plus a bounded-concurrency
//! "pulse" executor for per-item work.
//!
//! ## Features
//!
//! - Whitespace + lowercase analysis pipeline
//! - Corpus statistics and cached term frequencies, built once per corpus
//! - Pluggable scoring (BM25 by default, configurable `k1` / `b`)
//! - Deterministic ranked retrieval with stable tie-breaking
//! - Pulse scheduling on tokio or on a rayon pool, with per-unit failure
//!   isolation and cooperative cancellation
//!
//! ```
//! use pulse_rank::prelude::*;
//!
//! let docs = vec![
//!     Document::builder().add_text("city", "Boston").build(),
//!     Document::builder().add_text("city", "Boston").build(),
//!     Document::builder().add_text("city", "Cambridge").build(),
//! ];
//! let engine = Bm25Engine::build(&docs, SearchConfig::new(["city"])).unwrap();
//! let ranked = engine.search("boston").unwrap();
//!
//! assert_eq!(ranked.len(), 3);
//! assert_eq!(ranked[2].doc_index, 2);
//! assert_eq!(ranked[2].score, 0.0);
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod lexical;
pub mod pulse;

pub mod prelude {
    pub use crate::config::EngineSettings;
    pub use crate::document::document::Document;
    pub use crate::document::field_value::FieldValue;
    pub use crate::error::{PulseRankError, Result};
    pub use crate::lexical::config::{Bm25Params, SearchConfig};
    pub use crate::lexical::engine::Bm25Engine;
    pub use crate::lexical::types::ScoredMatch;
    pub use crate::pulse::{
        BlockingPulseScheduler, CancellationToken, PulseConfig, PulseReport, PulseScheduler,
        UnitOutcome,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
