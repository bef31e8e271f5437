//! Human-readable presets for the chopshop engine.
//!
//! Presets are TOML documents holding parameter values in display units,
//! keyed by each parameter's stable string id. They resolve to a
//! [`ParameterState`](chopshop_engine::ParameterState) that the control thread
//! publishes to the audio thread in one piece.
//!
//! # Features
//!
//! - **Presets**: parse, validate and serialize TOML presets
//! - **Validation**: range and label checks in display units
//! - **Factory Presets**: built-in presets for each cut procedure
//!
//! # Example
//!
//! ```rust
//! use chopshop_config::{Preset, load_factory_preset};
//! use chopshop_engine::{EngineConfig, ParameterId, create};
//!
//! let (controller, _processor, _reports) = create(&EngineConfig::default());
//! controller.publish(load_factory_preset("stutter").unwrap());
//!
//! let preset = Preset::new("Mine")
//!     .with_value("cut_proc", "WarpCut")
//!     .with_value("warp_speed", 75.0);
//! controller.publish(preset.to_state().unwrap());
//!
//! let captured = Preset::from_state("Snapshot", &controller.state());
//! assert_eq!(captured.get("cut_proc").unwrap().to_string(), "WarpCut");
//! # let _ = ParameterId::CutProc;
//! ```

mod error;
mod preset;

/// Preset value validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset, load_factory_preset,
};
pub use preset::{Preset, PresetValue};
pub use validation::{plain_bounds, preset_errors, resolve_value, validate_preset};
