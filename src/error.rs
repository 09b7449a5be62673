//! Error types for the pulse-rank library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`PulseRankError`] enum.
//!
//! # Examples
//!
//! ```
//! use pulse_rank::error::{PulseRankError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(PulseRankError::invalid_config("pulse_size must be positive"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for pulse-rank operations.
#[derive(Error, Debug)]
pub enum PulseRankError {
    /// Corpus statistics were requested over zero documents.
    #[error("Empty corpus: statistics require at least one document")]
    EmptyCorpus,

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A scheduled unit returned an error or panicked.
    #[error("Unit {id} failed: {message}")]
    UnitFailure {
        /// Dataset index of the failing unit.
        id: usize,
        /// Rendered error or panic payload.
        message: String,
    },

    /// A document or query does not have the expected shape.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Invalid argument passed to an API call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation cancelled through a cancellation token.
    #[error("Operation cancelled: {0}")]
    OperationCancelled(String),

    /// Broken internal invariant.
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O errors (document files, config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV decoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with PulseRankError.
pub type Result<T> = std::result::Result<T, PulseRankError>;

impl PulseRankError {
    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        PulseRankError::InvalidConfig(msg.into())
    }

    /// Create a new malformed input error.
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        PulseRankError::MalformedInput(msg.into())
    }

    /// Create a new unit failure for the unit at `id`.
    pub fn unit_failure<S: Into<String>>(id: usize, msg: S) -> Self {
        PulseRankError::UnitFailure {
            id,
            message: msg.into(),
        }
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        PulseRankError::InvalidArgument(msg.into())
    }

    /// Create a new cancelled error.
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        PulseRankError::OperationCancelled(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        PulseRankError::Internal(msg.into())
    }

    /// True for errors that are raised before any work starts.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            PulseRankError::EmptyCorpus | PulseRankError::InvalidConfig(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = PulseRankError::invalid_config("pulse_size must be positive");
        assert_eq!(
            error.to_string(),
            "Invalid configuration: pulse_size must be positive"
        );

        let error = PulseRankError::malformed("field 'city' is binary");
        assert_eq!(error.to_string(), "Malformed input: field 'city' is binary");

        let error = PulseRankError::unit_failure(3, "boom");
        assert_eq!(error.to_string(), "Unit 3 failed: boom");

        assert_eq!(
            PulseRankError::EmptyCorpus.to_string(),
            "Empty corpus: statistics require at least one document"
        );
    }

    #[test]
    fn test_precondition_classification() {
        assert!(PulseRankError::EmptyCorpus.is_precondition());
        assert!(PulseRankError::invalid_config("x").is_precondition());
        assert!(!PulseRankError::unit_failure(0, "x").is_precondition());
        assert!(!PulseRankError::malformed("x").is_precondition());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = PulseRankError::from(io_error);

        match error {
            PulseRankError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
