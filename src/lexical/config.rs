//! Configuration for the BM25 engine.

use serde::{Deserialize, Serialize};

use crate::error::{PulseRankError, Result};

/// Fields read from each document when no field list is given.
pub const DEFAULT_FIELDS: &[&str] = &["title", "body"];

/// BM25 free parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    /// K1 parameter for BM25 (term frequency saturation).
    pub k1: f64,

    /// B parameter for BM25 (document length normalization).
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Bm25Params { k1: 1.2, b: 0.75 }
    }
}

impl Bm25Params {
    /// Create parameters, validating their ranges.
    pub fn new(k1: f64, b: f64) -> Result<Self> {
        let params = Bm25Params { k1, b };
        params.validate()?;
        Ok(params)
    }

    /// `k1` must be finite and non-negative, `b` must lie in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(PulseRankError::invalid_config(format!(
                "k1 must be a finite, non-negative number (got {})",
                self.k1
            )));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(PulseRankError::invalid_config(format!(
                "b must be within [0, 1] (got {})",
                self.b
            )));
        }
        Ok(())
    }
}

/// Configuration for one engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Document fields to analyze, in concatenation order.
    pub fields: Vec<String>,

    /// BM25 parameters.
    pub bm25: Bm25Params,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
            bm25: Bm25Params::default(),
        }
    }
}

impl SearchConfig {
    /// Create a config reading the given fields with default BM25 parameters.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SearchConfig {
            fields: fields.into_iter().map(Into::into).collect(),
            bm25: Bm25Params::default(),
        }
    }

    /// Set the BM25 parameters.
    pub fn with_bm25(mut self, bm25: Bm25Params) -> Self {
        self.bm25 = bm25;
        self
    }

    /// Set `k1`.
    pub fn with_k1(mut self, k1: f64) -> Self {
        self.bm25.k1 = k1;
        self
    }

    /// Set `b`.
    pub fn with_b(mut self, b: f64) -> Self {
        self.bm25.b = b;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(PulseRankError::invalid_config(
                "at least one document field must be configured",
            ));
        }
        if self.fields.iter().any(|f| f.trim().is_empty()) {
            return Err(PulseRankError::invalid_config("field names must not be blank"));
        }
        self.bm25.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.fields, vec!["title", "body"]);
        assert_eq!(config.bm25.k1, 1.2);
        assert_eq!(config.bm25.b, 0.75);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SearchConfig::new(["name", "city"]).with_k1(2.0).with_b(0.5);
        assert_eq!(config.fields, vec!["name", "city"]);
        assert_eq!(config.bm25, Bm25Params { k1: 2.0, b: 0.5 });
    }

    #[test]
    fn test_validation() {
        assert!(SearchConfig::new(Vec::<String>::new()).validate().is_err());
        assert!(SearchConfig::new(["city", " "]).validate().is_err());
        assert!(SearchConfig::new(["city"]).with_k1(-0.1).validate().is_err());
        assert!(SearchConfig::new(["city"]).with_k1(f64::NAN).validate().is_err());
        assert!(SearchConfig::new(["city"]).with_b(1.5).validate().is_err());
        assert!(Bm25Params::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SearchConfig = serde_json::from_str(r#"{"fields": ["city"]}"#).unwrap();
        assert_eq!(config.fields, vec!["city"]);
        assert_eq!(config.bm25, Bm25Params::default());
    }
}
