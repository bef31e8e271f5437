//! Bit crusher stage: bit depth quantization plus sample-and-hold rate
//! reduction, re-randomized on every cut.
//!
//! # Quantization
//!
//! ```text
//! levels    = 2^bits
//! quantized = floor(x · levels + 0.5) / levels
//! ```
//!
//! At 32 bits the scaling is exact in `f32`, so the quantizer is transparent.
//!
//! # Rate Reduction
//!
//! A phase accumulator runs at the hold frequency; each time it wraps, the
//! current input is latched and held until the next wrap. A hold frequency
//! equal to the sample rate latches every sample.
//!
//! # Randomization
//!
//! [`BitCrusher::on_cut`] draws a bit depth from `[min_bits, max_bits]` and a
//! hold frequency from `[min_freq, max_freq]` using the stage's own [`Rng`].

use chopshop_core::{Rng, StereoStage};
use libm::{floor, floorf, powf};

/// Bit depth used until the first cut.
const TRANSPARENT_BITS: i32 = 32;

/// Bit reduction and sample-and-hold stage.
///
/// # Example
///
/// ```rust
/// use chopshop_core::StereoStage;
/// use chopshop_effects::BitCrusher;
///
/// let mut crusher = BitCrusher::new(44100.0);
/// // Disabled: bit-exact passthrough.
/// assert_eq!(crusher.process_stereo(0.123, -0.456), (0.123, -0.456));
///
/// crusher.set_enabled(true);
/// crusher.set_bit_range(2, 2);
/// crusher.set_freq_range(44100.0, 44100.0);
/// crusher.on_cut();
/// assert_eq!(crusher.process_stereo(0.3, -0.3), (0.25, -0.25));
/// ```
#[derive(Debug, Clone)]
pub struct BitCrusher {
    enabled: bool,
    sample_rate: f64,
    min_bits: i32,
    max_bits: i32,
    min_freq: f64,
    max_freq: f64,
    /// Active bit depth, chosen per cut.
    bits: i32,
    /// Hold phase increment per sample (hold frequency / sample rate).
    hold_increment: f64,
    phase: f64,
    held_l: f32,
    held_r: f32,
    rng: Rng,
}

impl BitCrusher {
    /// Create a disabled crusher at the given sample rate.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            enabled: false,
            sample_rate,
            min_bits: TRANSPARENT_BITS,
            max_bits: TRANSPARENT_BITS,
            min_freq: sample_rate,
            max_freq: sample_rate,
            bits: TRANSPARENT_BITS,
            hold_increment: 1.0,
            phase: 1.0,
            held_l: 0.0,
            held_r: 0.0,
            rng: Rng::default(),
        }
    }

    /// Enable or disable. Disabled means bit-exact passthrough.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Lower bound for the per-cut bit depth (1..=32).
    pub fn set_min_bits(&mut self, bits: i32) {
        self.min_bits = bits.clamp(1, TRANSPARENT_BITS);
    }

    /// Upper bound for the per-cut bit depth (1..=32).
    pub fn set_max_bits(&mut self, bits: i32) {
        self.max_bits = bits.clamp(1, TRANSPARENT_BITS);
    }

    /// Set both bit depth bounds.
    pub fn set_bit_range(&mut self, min: i32, max: i32) {
        self.set_min_bits(min);
        self.set_max_bits(max);
    }

    /// Lower bound for the per-cut hold frequency in Hz.
    pub fn set_min_freq(&mut self, hz: f64) {
        self.min_freq = hz.max(0.0);
    }

    /// Upper bound for the per-cut hold frequency in Hz.
    pub fn set_max_freq(&mut self, hz: f64) {
        self.max_freq = hz.max(0.0);
    }

    /// Set both hold frequency bounds.
    pub fn set_freq_range(&mut self, min: f64, max: f64) {
        self.set_min_freq(min);
        self.set_max_freq(max);
    }

    /// Restart the random sequence.
    pub fn reseed(&mut self, seed: u32) {
        self.rng.reseed(seed);
    }

    /// Draw new settings for the cut that just started.
    pub fn on_cut(&mut self) {
        self.bits = self.rng.range_i32(self.min_bits, self.max_bits);
        let freq = self.rng.range_f64(self.min_freq, self.max_freq);
        self.hold_increment = if self.sample_rate > 0.0 {
            (freq / self.sample_rate).clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    /// Active bit depth.
    pub fn bits(&self) -> i32 {
        self.bits
    }

    /// Active hold frequency in Hz.
    pub fn hold_frequency(&self) -> f64 {
        self.hold_increment * self.sample_rate
    }

    #[inline]
    fn quantize(sample: f32, bits: i32) -> f32 {
        let levels = powf(2.0, bits as f32);
        floorf(sample * levels + 0.5) / levels
    }
}

impl StereoStage for BitCrusher {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        if !self.enabled {
            return (left, right);
        }

        if self.phase >= 1.0 {
            self.phase -= floor(self.phase);
            self.held_l = Self::quantize(left, self.bits);
            self.held_r = Self::quantize(right, self.bits);
        }
        self.phase += self.hold_increment;
        (self.held_l, self.held_r)
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        let freq = self.hold_frequency();
        self.sample_rate = sample_rate;
        self.hold_increment = if sample_rate > 0.0 {
            (freq / sample_rate).clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    fn reset(&mut self) {
        self.phase = 1.0;
        self.held_l = 0.0;
        self.held_r = 0.0;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_is_bit_exact() {
        let mut c = BitCrusher::new(48000.0);
        c.set_bit_range(1, 1);
        c.on_cut();
        for x in [0.0, 1e-7, -0.333, 0.999] {
            assert_eq!(c.process_stereo(x, -x), (x, -x));
        }
    }

    #[test]
    fn test_32_bits_transparent() {
        let mut c = BitCrusher::new(48000.0);
        c.set_enabled(true);
        for x in [0.1f32, -0.7, 0.123_456_7] {
            assert_eq!(c.process_stereo(x, x), (x, x));
        }
    }

    #[test]
    fn test_quantize_levels() {
        assert_eq!(BitCrusher::quantize(0.3, 2), 0.25);
        assert_eq!(BitCrusher::quantize(0.4, 2), 0.5);
        assert_eq!(BitCrusher::quantize(-0.3, 2), -0.25);
    }

    #[test]
    fn test_hold_quarter_rate() {
        let mut c = BitCrusher::new(48000.0);
        c.set_enabled(true);
        c.set_freq_range(12000.0, 12000.0);
        c.on_cut();
        assert!((c.hold_frequency() - 12000.0).abs() < 1e-9);

        let out: Vec<f32> = (1..=8)
            .map(|i| c.process_stereo(i as f32 * 0.1, 0.0).0)
            .collect();
        // Latches on the first sample, then every fourth.
        assert_eq!(out[0], out[3]);
        assert_ne!(out[3], out[4]);
        assert_eq!(out[4], out[7]);
    }

    #[test]
    fn test_on_cut_stays_in_ranges() {
        let mut c = BitCrusher::new(44100.0);
        c.set_bit_range(4, 8);
        c.set_freq_range(441.0, 44100.0);
        for _ in 0..200 {
            c.on_cut();
            assert!((4..=8).contains(&c.bits()));
            let f = c.hold_frequency();
            assert!((440.999..=44100.001).contains(&f), "{f}");
        }
    }

    #[test]
    fn test_reseed_reproduces() {
        let mut a = BitCrusher::new(44100.0);
        let mut b = BitCrusher::new(44100.0);
        for c in [&mut a, &mut b] {
            c.set_bit_range(1, 32);
            c.reseed(42);
        }
        for _ in 0..20 {
            a.on_cut();
            b.on_cut();
            assert_eq!(a.bits(), b.bits());
        }
    }

    #[test]
    fn test_sample_rate_keeps_hold_frequency() {
        let mut c = BitCrusher::new(44100.0);
        c.set_freq_range(4410.0, 4410.0);
        c.on_cut();
        c.set_sample_rate(88200.0);
        assert!((c.hold_frequency() - 4410.0).abs() < 1e-6);
    }
}
