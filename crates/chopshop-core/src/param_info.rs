//! Parameter descriptors: display metadata and the normalized/plain/native
//! mappings for one engine parameter.
//!
//! Three value spaces are involved:
//!
//! - **normalized**: \[0.0, 1.0\], what the host stores and automates
//! - **plain**: what the user reads and types (`25 ms`, `-1200 ct`, `WarpCut`)
//! - **native**: what the engine setter receives; usually equal to plain, but a
//!   [`NativeMap`] can route it through a custom transfer function
//!
//! Every descriptor has exactly one [`ParamRange`] kind. Enumerations carry a
//! label list whose length equals `step_count + 1`, which
//! [`ParamDescriptor::is_consistent`] checks.
//!
//! # Example
//!
//! ```rust
//! use chopshop_core::{ParamDescriptor, ParamUnit};
//!
//! const FADE: ParamDescriptor =
//!     ParamDescriptor::continuous("Fade", "fade", 0.0, 100.0, 0.0).with_unit(ParamUnit::Milliseconds);
//!
//! assert_eq!(FADE.to_plain(0.25), 25.0);
//! assert_eq!(FADE.format_value(0.25), "25.0 ms");
//! assert_eq!(FADE.parse_value("50 ms"), Some(0.5));
//! ```

use crate::param_map::{
    normalized_to_plain, normalized_to_steps, plain_to_normalized, steps_to_normalized,
};
use alloc::format;
use alloc::string::String;

/// Value range: continuous interval or discrete steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamRange {
    /// Linear plain range `[min, max]`.
    Continuous {
        /// Plain value at normalized 0.0.
        min: f64,
        /// Plain value at normalized 1.0.
        max: f64,
    },
    /// `step_count + 1` integer values starting at `start`.
    Stepped {
        /// Number of steps (one less than the number of values).
        step_count: u32,
        /// Plain value of the first step.
        start: i32,
    },
}

impl ParamRange {
    /// Normalized → plain.
    #[inline]
    pub fn to_plain(&self, normalized: f64) -> f64 {
        match *self {
            Self::Continuous { min, max } => normalized_to_plain(min, max, normalized),
            Self::Stepped { step_count, start } => {
                f64::from(normalized_to_steps(step_count, start, normalized))
            }
        }
    }

    /// Plain → normalized. Stepped plains are rounded to the nearest step.
    #[inline]
    pub fn to_normalized(&self, plain: f64) -> f64 {
        match *self {
            Self::Continuous { min, max } => plain_to_normalized(min, max, plain),
            Self::Stepped { step_count, start } => {
                steps_to_normalized(step_count, start, libm::round(plain))
            }
        }
    }

    /// Step count, `0` for continuous ranges.
    pub const fn step_count(&self) -> u32 {
        match *self {
            Self::Continuous { .. } => 0,
            Self::Stepped { step_count, .. } => step_count,
        }
    }
}

/// How the engine-facing value is derived from the normalized value.
#[derive(Debug, Clone, Copy)]
pub enum NativeMap {
    /// The engine takes the normalized value itself.
    Normalized,
    /// The engine takes the plain (display) value.
    Plain,
    /// A custom transfer function of the normalized value.
    Custom(fn(f64) -> f64),
}

/// Parameter capability flags.
///
/// # Example
///
/// ```rust
/// use chopshop_core::ParamFlags;
///
/// let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);
/// assert!(flags.contains(ParamFlags::STEPPED));
/// assert!(!flags.contains(ParamFlags::READ_ONLY));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Host can automate this parameter.
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Parameter has discrete steps.
    pub const STEPPED: Self = Self(1 << 1);
    /// Steps are shown as a list of labels.
    pub const LIST: Self = Self(1 << 2);
    /// The host's bypass switch.
    pub const BYPASS: Self = Self(1 << 3);
    /// Reported by the engine, never written by the host.
    pub const READ_ONLY: Self = Self(1 << 4);

    /// Check if all bits in `other` are set.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Combine two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Display unit for plain values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Percentage, for probabilities and levels.
    Percent,
    /// Milliseconds.
    Milliseconds,
    /// Cents (1/100 semitone).
    Cents,
    /// Bit depth.
    Bits,
    /// Musical bars.
    Bars,
    /// No unit.
    None,
}

impl ParamUnit {
    /// Suffix appended to formatted values.
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Percent => "%",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::Cents => " ct",
            ParamUnit::Bits => " bits",
            ParamUnit::Bars => " bars",
            ParamUnit::None => "",
        }
    }
}

/// Immutable description of one parameter.
///
/// Built with `const` constructors so a whole parameter table can live in a
/// `static`.
#[derive(Debug, Clone, Copy)]
pub struct ParamDescriptor {
    /// Display name, e.g. `"Min Amp"`.
    pub name: &'static str,
    /// Stable snake_case identifier used by presets.
    pub string_id: &'static str,
    /// Default in normalized space.
    pub default_normalized: f64,
    /// Plain range (display/entry).
    pub range: ParamRange,
    /// Engine-facing value.
    pub native: NativeMap,
    /// Labels for enumerations, one per step.
    pub labels: Option<&'static [&'static str]>,
    /// Display unit.
    pub unit: ParamUnit,
    /// Decimal places shown for continuous values.
    pub precision: u8,
    /// Capability flags.
    pub flags: ParamFlags,
}

impl ParamDescriptor {
    /// Continuous parameter over `[min, max]`. Native value is the plain value.
    pub const fn continuous(
        name: &'static str,
        string_id: &'static str,
        min: f64,
        max: f64,
        default_normalized: f64,
    ) -> Self {
        Self {
            name,
            string_id,
            default_normalized,
            range: ParamRange::Continuous { min, max },
            native: NativeMap::Plain,
            labels: None,
            unit: ParamUnit::None,
            precision: 1,
            flags: ParamFlags::AUTOMATABLE,
        }
    }

    /// Stepped parameter with `step_count + 1` integer values from `start`.
    pub const fn stepped(
        name: &'static str,
        string_id: &'static str,
        step_count: u32,
        start: i32,
        default_normalized: f64,
    ) -> Self {
        Self {
            name,
            string_id,
            default_normalized,
            range: ParamRange::Stepped { step_count, start },
            native: NativeMap::Plain,
            labels: None,
            unit: ParamUnit::None,
            precision: 0,
            flags: ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED),
        }
    }

    /// Attach enumeration labels (one per step).
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = Some(labels);
        self.flags = self.flags.union(ParamFlags::LIST);
        self
    }

    /// Set the native mapping.
    pub const fn with_native(mut self, native: NativeMap) -> Self {
        self.native = native;
        self
    }

    /// Set the display unit.
    pub const fn with_unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Set the displayed decimal places.
    pub const fn with_precision(mut self, precision: u8) -> Self {
        self.precision = precision;
        self
    }

    /// Replace the capability flags.
    pub const fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Step count, `0` for continuous parameters.
    pub const fn step_count(&self) -> u32 {
        self.range.step_count()
    }

    /// Whether the label list (if any) matches the step count exactly.
    pub const fn is_consistent(&self) -> bool {
        match (self.range, self.labels) {
            (ParamRange::Stepped { step_count, .. }, Some(labels)) => {
                labels.len() == step_count as usize + 1
            }
            (ParamRange::Continuous { .. }, Some(_)) => false,
            (ParamRange::Stepped { step_count, .. }, None) => step_count > 0,
            (ParamRange::Continuous { min, max }, None) => max > min,
        }
    }

    /// Normalized → plain.
    #[inline]
    pub fn to_plain(&self, normalized: f64) -> f64 {
        self.range.to_plain(normalized)
    }

    /// Plain → normalized.
    #[inline]
    pub fn to_normalized(&self, plain: f64) -> f64 {
        self.range.to_normalized(plain)
    }

    /// Normalized → native (the value handed to the engine setter).
    #[inline]
    pub fn to_native(&self, normalized: f64) -> f64 {
        match self.native {
            NativeMap::Normalized => normalized,
            NativeMap::Plain => self.to_plain(normalized),
            NativeMap::Custom(f) => f(normalized),
        }
    }

    /// Label of the step selected by `normalized`, for enumerations.
    pub fn label(&self, normalized: f64) -> Option<&'static str> {
        let labels = self.labels?;
        let ParamRange::Stepped { step_count, start } = self.range else {
            return None;
        };
        let index = normalized_to_steps(step_count, start, normalized) - start;
        labels.get(usize::try_from(index).ok()?).copied()
    }

    /// Text shown for a normalized value.
    pub fn format_value(&self, normalized: f64) -> String {
        if let Some(label) = self.label(normalized) {
            return String::from(label);
        }
        let plain = self.to_plain(normalized);
        let precision = match self.range {
            ParamRange::Stepped { .. } => 0,
            ParamRange::Continuous { .. } => usize::from(self.precision),
        };
        format!("{:.*}{}", precision, plain, self.unit.suffix())
    }

    /// Normalized value for typed text: a label, or a number with an optional
    /// unit suffix. The result is clamped to \[0.0, 1.0\].
    pub fn parse_value(&self, text: &str) -> Option<f64> {
        let text = text.trim();
        if let (Some(labels), ParamRange::Stepped { start, .. }) = (self.labels, self.range)
            && let Some(index) = labels.iter().position(|l| l.eq_ignore_ascii_case(text))
        {
            return Some(self.to_normalized(f64::from(start) + index as f64));
        }

        let suffix = self.unit.suffix().trim();
        let number = if suffix.is_empty() {
            text
        } else {
            text.strip_suffix(suffix).unwrap_or(text).trim_end()
        };
        let plain: f64 = number.parse().ok()?;
        if !plain.is_finite() {
            return None;
        }
        Some(self.to_normalized(plain).clamp(0.0, 1.0))
    }
}
