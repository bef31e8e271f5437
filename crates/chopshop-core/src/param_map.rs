//! Normalized ↔ plain value mapping.
//!
//! Hosts exchange every parameter as a normalized `f64` in \[0.0, 1.0\]. The
//! engine works in "plain" units (milliseconds, cents, step indices). These
//! four functions are the whole mapping layer: two shapes (continuous range and
//! discrete step count), each with a forward and an inverse.
//!
//! All functions are pure and allocation-free, so they may be called from the
//! audio thread as well as the control thread.
//!
//! # Step Mapping
//!
//! A stepped parameter with `step_count` steps has `step_count + 1` values.
//! The forward mapping multiplies by `step_count + 1` and clamps with `min`, so
//! every step owns an equal share of the normalized range and `1.0` lands on the
//! top step instead of one past it:
//!
//! ```text
//! step_count = 2:   [0.0 .. 0.333) -> 0   [0.333 .. 0.667) -> 1   [0.667 .. 1.0] -> 2
//! ```
//!
//! # Example
//!
//! ```rust
//! use chopshop_core::{normalized_to_plain, normalized_to_steps, steps_to_normalized};
//!
//! assert_eq!(normalized_to_plain(1.0, 50.0, 0.0), 1.0);
//! assert_eq!(normalized_to_steps(7, 1, 1.0), 8);
//! assert_eq!(normalized_to_steps(7, 1, steps_to_normalized(7, 1, 5.0)), 5);
//! ```

use libm::floor;

/// Maps a normalized value onto `[min, max]` linearly.
///
/// No clamping: the caller guarantees `normalized` is in \[0.0, 1.0\].
#[inline]
pub fn normalized_to_plain(min: f64, max: f64, normalized: f64) -> f64 {
    normalized * (max - min) + min
}

/// Inverse of [`normalized_to_plain`].
#[inline]
pub fn plain_to_normalized(min: f64, max: f64, plain: f64) -> f64 {
    (plain - min) / (max - min)
}

/// Maps a normalized value onto one of `step_count + 1` integer steps,
/// offset by `start`.
///
/// `0.0` yields `start`, `1.0` yields `step_count + start`.
#[inline]
pub fn normalized_to_steps(step_count: u32, start: i32, normalized: f64) -> i32 {
    let step = floor(normalized * f64::from(step_count + 1)) as i64;
    step.min(i64::from(step_count)) as i32 + start
}

/// Inverse of [`normalized_to_steps`]: the normalized value at the bottom edge
/// of the step's share, which maps back onto the same step.
#[inline]
pub fn steps_to_normalized(step_count: u32, start: i32, plain: f64) -> f64 {
    (plain - f64::from(start)) / f64::from(step_count)
}
