//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings fixed when the engine is created.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 48000.0
/// report_rate_hz = 30.0
/// report_queue_capacity = 64
/// jump_tolerance_quarters = 0.01
/// ```
///
/// Every field is optional and falls back to [`EngineConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial sample rate in Hz. `Processor::setup` may change it later.
    pub sample_rate: f64,

    /// How often statistics are reported, in Hz.
    pub report_rate_hz: f64,

    /// Capacity of the report channel returned by [`create`](crate::create).
    pub report_queue_capacity: usize,

    /// Position jump, in quarter notes, treated as a transport relocation.
    pub jump_tolerance_quarters: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            report_rate_hz: 30.0,
            report_queue_capacity: 64,
            jump_tolerance_quarters: 0.01,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::invalid(
                "sample_rate",
                format!("must be positive, got {}", self.sample_rate),
            ));
        }
        if !(self.report_rate_hz.is_finite() && self.report_rate_hz > 0.0) {
            return Err(ConfigError::invalid(
                "report_rate_hz",
                format!("must be positive, got {}", self.report_rate_hz),
            ));
        }
        if self.report_queue_capacity == 0 {
            return Err(ConfigError::invalid("report_queue_capacity", "must be at least 1"));
        }
        if !(self.jump_tolerance_quarters.is_finite() && self.jump_tolerance_quarters >= 0.0) {
            return Err(ConfigError::invalid(
                "jump_tolerance_quarters",
                format!("must be zero or positive, got {}", self.jump_tolerance_quarters),
            ));
        }
        Ok(())
    }
}
