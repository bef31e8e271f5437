//! Small DSP math helpers shared by the stages.
//!
//! All functions are allocation-free and `no_std`.

use libm::exp2;

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Milliseconds to samples.
///
/// ```rust
/// use chopshop_core::ms_to_samples;
///
/// assert_eq!(ms_to_samples(10.0, 48000.0), 480.0);
/// ```
#[inline]
pub fn ms_to_samples(ms: f64, sample_rate: f64) -> f64 {
    ms * sample_rate / 1000.0
}

/// Playback-rate ratio for a detune in cents (`2^(cents / 1200)`).
///
/// ```rust
/// use chopshop_core::cents_to_ratio;
///
/// assert!((cents_to_ratio(1200.0) - 2.0).abs() < 1e-12);
/// assert!((cents_to_ratio(-1200.0) - 0.5).abs() < 1e-12);
/// ```
#[inline]
pub fn cents_to_ratio(cents: f64) -> f64 {
    exp2(cents / 1200.0)
}

/// Left/right gains for `pan` in \[-1.0, 1.0\] (-1 = hard left).
///
/// The centre is unity on both sides; panning attenuates the far side only.
#[inline]
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let pan = pan.clamp(-1.0, 1.0);
    ((1.0 - pan).min(1.0), (1.0 + pan).min(1.0))
}

/// Flush denormals to zero.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}
