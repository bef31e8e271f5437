//! Factory presets bundled with the library.
//!
//! Built-in presets that are always available without external files. Each
//! one exercises a different cut procedure and serves as a starting point.

use chopshop_engine::ParameterState;

use crate::Preset;
use crate::error::ConfigError;

/// Internal names of the factory presets.
pub static FACTORY_PRESET_NAMES: &[&str] = &["init", "stutter", "warp_ritard", "pusher", "crushed_comb"];

/// TOML content for factory presets, embedded at compile time.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("init", INIT_PRESET),
    ("stutter", STUTTER_PRESET),
    ("warp_ritard", WARP_RITARD_PRESET),
    ("pusher", PUSHER_PRESET),
    ("crushed_comb", CRUSHED_COMB_PRESET),
];

/// Initialization preset - every parameter at its default.
const INIT_PRESET: &str = r#"
name = "Init"
description = "Default settings - CutProc11 on a 6-cell grid, crusher and comb off"

[params]
"#;

/// Dense end-of-phrase stutters.
const STUTTER_PRESET: &str = r#"
name = "Stutter"
description = "CutProc11 with frequent stutter fills across the last half of each phrase"

[params]
cut_proc = "CutProc11"
subdiv = "16"
min_phrase = 1
max_phrase = 2
cp11_min_repeat = 1
cp11_max_repeat = 3
cp11_stutter = 95.0
cp11_area = 50.0
fade = "2 ms"
"#;

/// Slowing warped fills.
const WARP_RITARD_PRESET: &str = r#"
name = "Warp Ritard"
description = "WarpCut fills that mostly slow down, with a little pitch drop"

[params]
cut_proc = "WarpCut"
subdiv = "8"
warp_straight = 20.0
warp_regular = 10.0
warp_ritard = 85.0
warp_speed = 80.0
min_pitch = -200.0
max_pitch = 0.0
fade = "5 ms"
"#;

/// Busy one-cell fills with wide panning.
const PUSHER_PRESET: &str = r#"
name = "Pusher"
description = "SQPusher with high activity, random amplitude and wide stereo placement"

[params]
cut_proc = "SQPusher"
subdiv = "16"
sq_activity = 80.0
min_amp = 60.0
max_amp = 100.0
min_pan = -70.0
max_pan = 70.0
fill_duty = 60.0
fade = "1 ms"
"#;

/// Lo-fi cuts through a re-tuned comb.
const CRUSHED_COMB_PRESET: &str = r#"
name = "Crushed Comb"
description = "Every cut picks a new bit depth, hold rate and comb delay"

[params]
cut_proc = "CutProc11"
subdiv = "12"
crusher = "On"
crusher_min_bits = 4
crusher_max_bits = 10
crusher_min_freq = 10.0
crusher_max_freq = 60.0
comb = "On"
comb_type = "FeedBack"
comb_feedback = 60.0
comb_min_delay = "2 ms"
comb_max_delay = "12 ms"
duty = 80.0
"#;

/// Get all factory presets.
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| Preset::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by name.
///
/// Matches the internal name or the display name, case-insensitively.
///
/// # Example
///
/// ```rust
/// use chopshop_config::get_factory_preset;
///
/// let preset = get_factory_preset("Warp Ritard").unwrap();
/// assert_eq!(preset.name, "Warp Ritard");
/// assert!(get_factory_preset("nonexistent").is_none());
/// ```
pub fn get_factory_preset(name: &str) -> Option<Preset> {
    if let Some((_, toml)) = FACTORY_PRESETS_TOML
        .iter()
        .find(|(preset_name, _)| preset_name.eq_ignore_ascii_case(name))
    {
        return Preset::from_toml(toml).ok();
    }
    factory_presets()
        .into_iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
}

/// Resolve a factory preset to engine state, ready for `Controller::publish`.
pub fn load_factory_preset(name: &str) -> Result<ParameterState, ConfigError> {
    get_factory_preset(name)
        .ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))?
        .to_state()
}

/// Get the internal names of all factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESETS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Check if a name matches a factory preset (internal or display name).
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}
