//! Preset file format and conversion to engine state.

use std::collections::BTreeMap;
use std::fmt;

use chopshop_core::ParamFlags;
use chopshop_engine::{ParameterId, ParameterState};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::validation::resolve_value;

/// A preset value in display units: a number, or text (a label, or a number
/// with a unit suffix).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PresetValue {
    /// Plain number, e.g. `45.0` for 45 %.
    Number(f64),
    /// Label or number with unit, e.g. `"WarpCut"` or `"12 ms"`.
    Text(String),
}

impl From<f64> for PresetValue {
    fn from(value: f64) -> Self {
        PresetValue::Number(value)
    }
}

impl From<&str> for PresetValue {
    fn from(value: &str) -> Self {
        PresetValue::Text(value.to_string())
    }
}

impl From<String> for PresetValue {
    fn from(value: String) -> Self {
        PresetValue::Text(value)
    }
}

impl fmt::Display for PresetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetValue::Number(n) => write!(f, "{n}"),
            PresetValue::Text(s) => f.write_str(s),
        }
    }
}

/// A named set of parameter values.
///
/// Parameters not listed keep their defaults when the preset is applied.
///
/// # TOML Format
///
/// ```toml
/// name = "Stutter"
/// description = "Dense CutProc11 stutters at the end of each phrase"
///
/// [params]
/// cut_proc = "CutProc11"
/// subdiv = "16"
/// cp11_stutter = 95.0
/// fade = "2 ms"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Values keyed by parameter string id.
    #[serde(default)]
    pub params: BTreeMap<String, PresetValue>,
}

impl Preset {
    /// Create a new empty preset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            params: BTreeMap::new(),
        }
    }

    /// Create a preset with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set one value.
    pub fn with_value(mut self, string_id: impl Into<String>, value: impl Into<PresetValue>) -> Self {
        self.params.insert(string_id.into(), value.into());
        self
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Number of values set.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether no values are set.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Value for a string id.
    pub fn get(&self, string_id: &str) -> Option<&PresetValue> {
        self.params.get(string_id)
    }

    /// Resolve to a full engine state, defaults filling the gaps.
    pub fn to_state(&self) -> Result<ParameterState, ConfigError> {
        let mut state = ParameterState::default();
        self.apply_to(&mut state)?;
        Ok(state)
    }

    /// Overwrite the listed values in `state`. Nothing is written unless
    /// every value is valid.
    pub fn apply_to(&self, state: &mut ParameterState) -> Result<(), ConfigError> {
        let mut resolved = Vec::with_capacity(self.params.len());
        for (string_id, value) in &self.params {
            let normalized = resolve_value(string_id, value)?;
            // resolve_value already rejected unknown ids.
            if let Some(id) = ParameterId::from_string_id(string_id) {
                resolved.push((id, normalized));
            }
        }
        for (id, normalized) in resolved {
            state.set(id, normalized);
        }
        tracing::debug!(preset = %self.name, values = self.params.len(), "preset applied");
        Ok(())
    }

    /// Capture every writable parameter of `state`.
    ///
    /// Enumerations are written as labels, everything else as plain numbers.
    pub fn from_state(name: impl Into<String>, state: &ParameterState) -> Self {
        let mut preset = Self::new(name);
        for (id, normalized) in state.iter() {
            if id.is_read_only() {
                continue;
            }
            let desc = id.descriptor();
            let value = match desc.label(normalized) {
                Some(label) if desc.flags.contains(ParamFlags::LIST) => PresetValue::from(label),
                _ => PresetValue::Number(desc.to_plain(normalized)),
            };
            preset.params.insert(desc.string_id.to_string(), value);
        }
        preset
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
