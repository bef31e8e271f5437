//! Preset value validation.
//!
//! Preset values are written in display units: a number in the parameter's
//! plain range (`comb_feedback = 45.0` is 45 %), or a label for enumerated
//! parameters (`cut_proc = "WarpCut"`). Numbers may also be written as text
//! with a unit suffix (`fade = "12 ms"`). Validation resolves a value to the
//! normalized form the engine stores, rejecting anything outside the range.
//!
//! # Example
//!
//! ```rust
//! use chopshop_config::{PresetValue, resolve_value};
//! use chopshop_engine::ParameterId;
//!
//! let n = resolve_value("subdiv", &PresetValue::from("16")).unwrap();
//! assert_eq!(ParameterId::SubDiv.descriptor().format_value(n), "16");
//!
//! assert!(resolve_value("comb_feedback", &PresetValue::from(95.0)).is_err());
//! ```

use chopshop_core::{ParamDescriptor, ParamRange};
use chopshop_engine::ParameterId;

use crate::error::ConfigError;
use crate::preset::{Preset, PresetValue};

/// Slack allowed on range ends and step values, in plain units.
const TOLERANCE: f64 = 1e-9;

/// Look up a writable parameter by string id.
pub fn parameter(string_id: &str) -> Result<ParameterId, ConfigError> {
    match ParameterId::from_string_id(string_id) {
        Some(id) if !id.is_read_only() => Ok(id),
        Some(_) => Err(ConfigError::invalid_value(string_id, "parameter is read-only")),
        None => Err(ConfigError::UnknownParameter(string_id.to_string())),
    }
}

/// Resolve a preset value to a normalized value.
pub fn resolve_value(string_id: &str, value: &PresetValue) -> Result<f64, ConfigError> {
    let desc = parameter(string_id)?.descriptor();
    match value {
        PresetValue::Number(plain) => resolve_number(desc, *plain),
        PresetValue::Text(text) => resolve_text(desc, text),
    }
}

fn resolve_text(desc: &ParamDescriptor, text: &str) -> Result<f64, ConfigError> {
    let text = text.trim();
    if let Some(index) = label_index(desc, text) {
        return step_normalized(desc, index);
    }
    let suffix = desc.unit.suffix().trim();
    let number = if suffix.is_empty() {
        text
    } else {
        text.strip_suffix(suffix).unwrap_or(text).trim_end()
    };
    match number.parse::<f64>() {
        Ok(plain) => resolve_number(desc, plain),
        Err(_) => Err(ConfigError::invalid_value(
            desc.string_id,
            match desc.labels {
                Some(labels) => format!("'{text}' is not one of {}", labels.join(", ")),
                None => format!("'{text}' is not a number"),
            },
        )),
    }
}

fn resolve_number(desc: &ParamDescriptor, plain: f64) -> Result<f64, ConfigError> {
    if !plain.is_finite() {
        return Err(ConfigError::invalid_value(desc.string_id, "value is not finite"));
    }
    // Enumerations written as numbers match their label first (`subdiv = 16`).
    if plain.fract() == 0.0
        && let Some(index) = label_index(desc, &format!("{plain}"))
    {
        return step_normalized(desc, index);
    }

    let (lo, hi) = plain_bounds(desc);
    if plain < lo - TOLERANCE || plain > hi + TOLERANCE {
        return Err(ConfigError::invalid_value(
            desc.string_id,
            format!("{plain} outside [{lo}, {hi}]"),
        ));
    }
    if matches!(desc.range, ParamRange::Stepped { .. }) && (plain - plain.round()).abs() > TOLERANCE {
        return Err(ConfigError::invalid_value(
            desc.string_id,
            format!("{plain} is not a whole step"),
        ));
    }
    Ok(desc.to_normalized(plain.clamp(lo, hi)).clamp(0.0, 1.0))
}

fn label_index(desc: &ParamDescriptor, text: &str) -> Option<usize> {
    desc.labels?.iter().position(|l| l.eq_ignore_ascii_case(text))
}

fn step_normalized(desc: &ParamDescriptor, index: usize) -> Result<f64, ConfigError> {
    match desc.range {
        ParamRange::Stepped { start, .. } => Ok(desc.to_normalized(f64::from(start) + index as f64)),
        ParamRange::Continuous { .. } => Err(ConfigError::invalid_value(
            desc.string_id,
            "labels on a continuous parameter",
        )),
    }
}

/// Plain range of a parameter, low end first.
pub fn plain_bounds(desc: &ParamDescriptor) -> (f64, f64) {
    match desc.range {
        ParamRange::Continuous { min, max } => (min.min(max), min.max(max)),
        ParamRange::Stepped { step_count, start } => {
            let first = f64::from(start);
            (first, first + f64::from(step_count))
        }
    }
}

/// Validate every value of a preset, returning the first error.
pub fn validate_preset(preset: &Preset) -> Result<(), ConfigError> {
    for (string_id, value) in &preset.params {
        resolve_value(string_id, value)?;
    }
    Ok(())
}

/// Validate every value of a preset, collecting all errors.
pub fn preset_errors(preset: &Preset) -> Vec<ConfigError> {
    preset
        .params
        .iter()
        .filter_map(|(string_id, value)| resolve_value(string_id, value).err())
        .collect()
}
