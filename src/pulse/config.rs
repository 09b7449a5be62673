//! Configuration for pulse scheduling.

use serde::{Deserialize, Serialize};

use crate::error::{PulseRankError, Result};

/// Default number of units per pulse.
pub const DEFAULT_PULSE_SIZE: usize = 64;

/// Configuration for a pulse scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Maximum number of units in one pulse. A pulse must fully complete
    /// before the next one is admitted.
    pub pulse_size: usize,

    /// Maximum number of units active at the same time.
    /// Defaults to the number of CPU cores.
    pub max_concurrency: usize,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            pulse_size: DEFAULT_PULSE_SIZE,
            max_concurrency: num_cpus::get(),
        }
    }
}

impl PulseConfig {
    /// Create a validated configuration.
    pub fn new(pulse_size: usize, max_concurrency: usize) -> Result<Self> {
        let config = Self {
            pulse_size,
            max_concurrency,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the pulse size.
    pub fn with_pulse_size(mut self, pulse_size: usize) -> Self {
        self.pulse_size = pulse_size;
        self
    }

    /// Set the concurrency ceiling.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Both values must be positive.
    pub fn validate(&self) -> Result<()> {
        if self.pulse_size == 0 {
            return Err(PulseRankError::invalid_config("pulse_size must be positive"));
        }
        if self.max_concurrency == 0 {
            return Err(PulseRankError::invalid_config(
                "max_concurrency must be positive",
            ));
        }
        Ok(())
    }

    /// Number of pulses needed for `units` items.
    pub fn pulse_count(&self, units: usize) -> usize {
        units.div_ceil(self.pulse_size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = PulseConfig::default();
        assert_eq!(config.pulse_size, 64);
        assert!(config.max_concurrency >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(matches!(
            PulseConfig::new(0, 1),
            Err(PulseRankError::InvalidConfig(_))
        ));
        assert!(matches!(
            PulseConfig::new(1, 0),
            Err(PulseRankError::InvalidConfig(_))
        ));
        assert!(PulseConfig::new(1, 1).is_ok());
    }

    #[test]
    fn test_negative_values_fail_to_deserialize() {
        let result: std::result::Result<PulseConfig, _> =
            serde_json::from_str(r#"{"pulse_size": -2, "max_concurrency": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_pulse_count() {
        let config = PulseConfig::new(2, 1).unwrap();
        assert_eq!(config.pulse_count(0), 0);
        assert_eq!(config.pulse_count(5), 3);
        assert_eq!(config.pulse_count(6), 3);
    }
}
