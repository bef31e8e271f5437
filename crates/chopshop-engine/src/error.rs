//! Error types for state persistence and engine configuration.
//!
//! Nothing on the audio path returns these: real-time calls degrade to
//! no-ops instead. Errors only surface at the control-thread boundary.

use thiserror::Error;

/// Errors while encoding or decoding a persisted [`ParameterState`](crate::ParameterState).
#[derive(Debug, Error)]
pub enum StateError {
    /// Underlying stream failed or ended early.
    #[error("state I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The leading format tag is not ours.
    #[error("unknown state format tag {found:#010x}")]
    UnknownFormat {
        /// Tag found in the stream.
        found: u32,
    },

    /// The stream stores more values than the engine has parameters.
    #[error("state holds {count} parameters, engine has {max}")]
    TooManyParameters {
        /// Count stored in the stream.
        count: u32,
        /// Parameters known to the engine.
        max: usize,
    },
}

impl StateError {
    /// Create an unknown format error.
    pub fn unknown_format(found: u32) -> Self {
        StateError::UnknownFormat { found }
    }

    /// Create a too-many-parameters error.
    pub fn too_many(count: u32, max: usize) -> Self {
        StateError::TooManyParameters { count, max }
    }
}

/// Errors while loading an [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A field holds an unusable value
    #[error("invalid config field '{field}': {reason}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Create an invalid field error.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
