//! Combined settings for the CLI and embedding applications.
//!
//! ```json
//! {
//!   "search": { "fields": ["name", "city"], "bm25": { "k1": 1.2, "b": 0.75 } },
//!   "pulse": { "pulse_size": 32, "max_concurrency": 4 }
//! }
//! ```
//!
//! Every section and key is optional; missing values take their defaults.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lexical::config::SearchConfig;
use crate::pulse::config::PulseConfig;

/// Search and scheduling settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub search: SearchConfig,
    pub pulse: PulseConfig,
}

impl EngineSettings {
    /// Load settings from a JSON file and validate them.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let settings: EngineSettings = serde_json::from_str(&raw)?;
        settings.validate()?;
        debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        self.pulse.validate()
    }
}
