//! The engine's parameter table.
//!
//! Parameters are addressed by a dense index `0..PARAM_COUNT`. The order is
//! part of the persisted state format and must never change; new parameters
//! are appended.
//!
//! | Range | Group |
//! |-------|-------|
//! | 0-2   | Procedure, subdivision, seed |
//! | 3-13  | Cut shaping (fade, amp, pan, pitch, duty, phrase) |
//! | 14-22 | Procedure-specific settings |
//! | 23-27 | Bit crusher |
//! | 28-32 | Comb |
//! | 33    | Bypass |
//! | 34-35 | Read-only statistics |

use chopshop_core::{NativeMap, ParamDescriptor, ParamFlags, ParamUnit, lerp, normalized_to_steps};

/// Number of engine parameters.
pub const PARAM_COUNT: usize = 36;

/// Cells per measure selectable by the SubDiv parameter.
pub const SUBDIV_VALUES: [u32; 7] = [6, 8, 12, 16, 18, 24, 32];

/// Dense parameter identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ParameterId {
    CutProc,
    SubDiv,
    Seed,
    Fade,
    MinAmp,
    MaxAmp,
    MinPan,
    MaxPan,
    MinPitch,
    MaxPitch,
    Duty,
    FillDuty,
    MinPhrase,
    MaxPhrase,
    MinRepeat,
    MaxRepeat,
    Stutter,
    Area,
    Straight,
    Regular,
    Ritard,
    Speed,
    Activity,
    Crusher,
    CrusherMinBits,
    CrusherMaxBits,
    CrusherMinFreq,
    CrusherMaxFreq,
    Comb,
    CombType,
    CombFeedback,
    CombMinDelay,
    CombMaxDelay,
    Bypass,
    CutCount,
    BlockCount,
}

impl ParameterId {
    /// All parameters in index order.
    pub const ALL: [ParameterId; PARAM_COUNT] = {
        use ParameterId::*;
        [
            CutProc, SubDiv, Seed, Fade, MinAmp, MaxAmp, MinPan, MaxPan, MinPitch, MaxPitch,
            Duty, FillDuty, MinPhrase, MaxPhrase, MinRepeat, MaxRepeat, Stutter, Area, Straight,
            Regular, Ritard, Speed, Activity, Crusher, CrusherMinBits, CrusherMaxBits,
            CrusherMinFreq, CrusherMaxFreq, Comb, CombType, CombFeedback, CombMinDelay,
            CombMaxDelay, Bypass, CutCount, BlockCount,
        ]
    };

    /// Dense index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Identifier for a dense index.
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Identifier for a stable string id (e.g. `"cp11_stutter"`).
    pub fn from_string_id(string_id: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.descriptor().string_id == string_id)
    }

    /// Descriptor of this parameter.
    #[inline]
    pub fn descriptor(self) -> &'static ParamDescriptor {
        &DESCRIPTORS[self.index()]
    }

    /// Whether the parameter is a statistic reported by the engine.
    pub fn is_read_only(self) -> bool {
        self.descriptor().flags.contains(ParamFlags::READ_ONLY)
    }
}

const PROC_LABELS: &[&str] = &["CutProc11", "WarpCut", "SQPusher"];
const SUBDIV_LABELS: &[&str] = &["6", "8", "12", "16", "18", "24", "32"];
const TOGGLE_LABELS: &[&str] = &["Off", "On"];
const COMB_TYPE_LABELS: &[&str] = &["FeedBack", "FeedFwd"];

fn subdiv_native(normalized: f64) -> f64 {
    let step = normalized_to_steps(6, 0, normalized).clamp(0, 6) as usize;
    f64::from(SUBDIV_VALUES[step])
}

fn pan_native(normalized: f64) -> f64 {
    (normalized - 0.5) * 2.0
}

fn speed_native(normalized: f64) -> f64 {
    lerp(0.5, 0.999, normalized)
}

fn feedback_native(normalized: f64) -> f64 {
    lerp(0.0, 0.9, normalized)
}

const fn percent(name: &'static str, id: &'static str, default: f64) -> ParamDescriptor {
    ParamDescriptor::continuous(name, id, 0.0, 100.0, default)
        .with_unit(ParamUnit::Percent)
        .with_native(NativeMap::Normalized)
}

const fn toggle(name: &'static str, id: &'static str) -> ParamDescriptor {
    ParamDescriptor::stepped(name, id, 1, 0, 0.0).with_labels(TOGGLE_LABELS)
}

const fn pan(name: &'static str, id: &'static str, default: f64) -> ParamDescriptor {
    ParamDescriptor::continuous(name, id, -100.0, 100.0, default)
        .with_unit(ParamUnit::Percent)
        .with_precision(0)
        .with_native(NativeMap::Custom(pan_native))
}

const fn pitch(name: &'static str, id: &'static str) -> ParamDescriptor {
    ParamDescriptor::continuous(name, id, -2400.0, 2400.0, 0.5)
        .with_unit(ParamUnit::Cents)
        .with_precision(0)
}

const fn delay(name: &'static str, id: &'static str) -> ParamDescriptor {
    ParamDescriptor::continuous(name, id, 1.0, 50.0, 0.2).with_unit(ParamUnit::Milliseconds)
}

const fn statistic(name: &'static str, id: &'static str) -> ParamDescriptor {
    ParamDescriptor::continuous(name, id, 0.0, 1.0, 0.0)
        .with_native(NativeMap::Normalized)
        .with_precision(3)
        .with_flags(ParamFlags::READ_ONLY)
}

/// Descriptor table, indexed by [`ParameterId::index`].
pub static DESCRIPTORS: [ParamDescriptor; PARAM_COUNT] = [
    ParamDescriptor::stepped("CutProc", "cut_proc", 2, 0, 0.0).with_labels(PROC_LABELS),
    ParamDescriptor::stepped("SubDiv", "subdiv", 6, 0, 0.0)
        .with_labels(SUBDIV_LABELS)
        .with_native(NativeMap::Custom(subdiv_native)),
    ParamDescriptor::stepped("Seed", "seed", 15, 1, 0.0),
    ParamDescriptor::continuous("Fade", "fade", 0.0, 100.0, 0.0).with_unit(ParamUnit::Milliseconds),
    percent("Min Amp", "min_amp", 1.0),
    percent("Max Amp", "max_amp", 1.0),
    pan("Min Pan", "min_pan", 0.4),
    pan("Max Pan", "max_pan", 0.6),
    pitch("Min Pitch", "min_pitch"),
    pitch("Max Pitch", "max_pitch"),
    percent("Duty", "duty", 1.0),
    percent("Fill Duty", "fill_duty", 1.0),
    ParamDescriptor::stepped("Min Phrase", "min_phrase", 7, 1, 0.5).with_unit(ParamUnit::Bars),
    ParamDescriptor::stepped("Max Phrase", "max_phrase", 7, 1, 0.5).with_unit(ParamUnit::Bars),
    ParamDescriptor::stepped("CutProc11 Min Repeat", "cp11_min_repeat", 4, 0, 0.0),
    ParamDescriptor::stepped("CutProc11 Max Repeat", "cp11_max_repeat", 4, 0, 0.2),
    percent("CutProc11 Stutter", "cp11_stutter", 0.8),
    percent("CutProc11 Area", "cp11_area", 0.5),
    percent("WarpCut Straight", "warp_straight", 0.3),
    percent("WarpCut Regular", "warp_regular", 0.5),
    percent("WarpCut Ritard", "warp_ritard", 0.5),
    percent("WarpCut Speed", "warp_speed", 0.9).with_native(NativeMap::Custom(speed_native)),
    percent("SQPusher Activity", "sq_activity", 0.5),
    toggle("Crusher", "crusher"),
    ParamDescriptor::stepped("Crusher Min Bits", "crusher_min_bits", 31, 1, 1.0)
        .with_unit(ParamUnit::Bits),
    ParamDescriptor::stepped("Crusher Max Bits", "crusher_max_bits", 31, 1, 1.0)
        .with_unit(ParamUnit::Bits),
    percent("Crusher Min Freq", "crusher_min_freq", 0.5),
    percent("Crusher Max Freq", "crusher_max_freq", 0.5),
    toggle("Comb", "comb"),
    ParamDescriptor::stepped("Comb Type", "comb_type", 1, 0, 0.0).with_labels(COMB_TYPE_LABELS),
    ParamDescriptor::continuous("Comb Feedback", "comb_feedback", 0.0, 90.0, 0.5)
        .with_unit(ParamUnit::Percent)
        .with_native(NativeMap::Custom(feedback_native)),
    delay("Comb Min Delay", "comb_min_delay"),
    delay("Comb Max Delay", "comb_max_delay"),
    toggle("Bypass", "bypass").with_flags(
        ParamFlags::AUTOMATABLE
            .union(ParamFlags::STEPPED)
            .union(ParamFlags::LIST)
            .union(ParamFlags::BYPASS),
    ),
    statistic("Cut Count", "cut_count"),
    statistic("Block Count", "block_count"),
];

/// One normalized value per parameter: the unit of bulk transfer and of
/// persistence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterState([f64; PARAM_COUNT]);

impl Default for ParameterState {
    fn default() -> Self {
        let mut values = [0.0; PARAM_COUNT];
        for (value, desc) in values.iter_mut().zip(DESCRIPTORS.iter()) {
            *value = desc.default_normalized;
        }
        Self(values)
    }
}

impl ParameterState {
    /// Normalized value of a parameter.
    #[inline]
    pub fn get(&self, id: ParameterId) -> f64 {
        self.0[id.index()]
    }

    /// Set a normalized value, clamped to \[0, 1\]. NaN becomes the default.
    #[inline]
    pub fn set(&mut self, id: ParameterId, normalized: f64) {
        self.0[id.index()] = sanitize(id, normalized);
    }

    /// Normalized value by dense index.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Set by dense index. Out-of-range indices are ignored.
    pub fn set_value(&mut self, index: usize, normalized: f64) {
        if let Some(id) = ParameterId::from_index(index) {
            self.set(id, normalized);
        }
    }

    /// Mutable access without clamping, for accumulating statistics.
    #[inline]
    pub fn raw_mut(&mut self, id: ParameterId) -> &mut f64 {
        &mut self.0[id.index()]
    }

    /// All values in index order.
    pub fn values(&self) -> &[f64; PARAM_COUNT] {
        &self.0
    }

    /// Native value of a parameter (what the kernel setter receives).
    pub fn native(&self, id: ParameterId) -> f64 {
        id.descriptor().to_native(self.get(id))
    }

    /// Set a parameter from its plain (display) value.
    pub fn set_plain(&mut self, id: ParameterId, plain: f64) {
        self.set(id, id.descriptor().to_normalized(plain));
    }

    /// Iterate `(id, normalized)` in index order.
    pub fn iter(&self) -> impl Iterator<Item = (ParameterId, f64)> + '_ {
        ParameterId::ALL.iter().map(|&id| (id, self.get(id)))
    }
}

fn sanitize(id: ParameterId, normalized: f64) -> f64 {
    if normalized.is_nan() {
        id.descriptor().default_normalized
    } else {
        normalized.clamp(0.0, 1.0)
    }
}
