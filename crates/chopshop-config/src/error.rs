//! Error types for preset operations.

use thiserror::Error;

/// Errors that can occur while parsing, validating or applying presets.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Preset not found
    #[error("preset not found: {0}")]
    PresetNotFound(String),

    /// Unknown parameter id
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// Invalid parameter value
    #[error("invalid value for parameter '{param}': {reason}")]
    InvalidValue {
        /// String id of the parameter.
        param: String,
        /// Description of why the value is invalid.
        reason: String,
    },
}

impl ConfigError {
    /// Create an invalid value error.
    pub fn invalid_value(param: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            param: param.into(),
            reason: reason.into(),
        }
    }
}
