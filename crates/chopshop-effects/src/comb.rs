//! Comb stage: a single-tap feedback or feed-forward comb with a delay time
//! re-randomized on every cut.
//!
//! ```text
//! feedback:      y[n] = x[n] + g · y[n - D]        out = y · (1 - g)
//! feed-forward:  y[n] = x[n] + g · x[n - D]        out = y / (1 + g)
//! ```
//!
//! Both outputs are normalized so a DC input keeps unity gain.

use chopshop_core::{DelayLine, Rng, StereoStage, flush_denormal, ms_to_samples};

/// Longest comb delay in milliseconds.
pub const MAX_DELAY_MS: f64 = 50.0;

/// Delay time used until the first cut.
const INITIAL_DELAY_MS: f64 = 10.0;

/// Comb topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombType {
    /// Recirculating (IIR) comb.
    #[default]
    Feedback,
    /// Single echo (FIR) comb.
    FeedForward,
}

/// Stereo comb filter stage.
///
/// # Example
///
/// ```rust
/// use chopshop_core::StereoStage;
/// use chopshop_effects::{CombStage, CombType};
///
/// let mut comb = CombStage::new(48000.0);
/// comb.set_enabled(true);
/// comb.set_comb_type(CombType::FeedForward);
/// comb.set_feedback(0.5);
/// let (l, r) = comb.process_stereo(1.0, 1.0);
/// assert!((l - 1.0 / 1.5).abs() < 1e-6 && l == r);
/// ```
#[derive(Debug, Clone)]
pub struct CombStage {
    enabled: bool,
    comb_type: CombType,
    feedback: f32,
    min_delay_ms: f64,
    max_delay_ms: f64,
    /// Active delay in samples, chosen per cut.
    delay_samples: f32,
    sample_rate: f64,
    line_l: DelayLine,
    line_r: DelayLine,
    rng: Rng,
}

impl CombStage {
    /// Create a disabled comb. Allocates the delay lines.
    pub fn new(sample_rate: f64) -> Self {
        let mut comb = Self {
            enabled: false,
            comb_type: CombType::Feedback,
            feedback: 0.45,
            min_delay_ms: INITIAL_DELAY_MS,
            max_delay_ms: INITIAL_DELAY_MS,
            delay_samples: 0.0,
            sample_rate,
            line_l: DelayLine::from_time(sample_rate, MAX_DELAY_MS / 1000.0),
            line_r: DelayLine::from_time(sample_rate, MAX_DELAY_MS / 1000.0),
            rng: Rng::default(),
        };
        comb.set_delay_ms(INITIAL_DELAY_MS);
        comb
    }

    /// Enable or disable. Disabled means passthrough.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Select feedback or feed-forward topology.
    pub fn set_comb_type(&mut self, comb_type: CombType) {
        self.comb_type = comb_type;
    }

    /// Gain of the delayed path, clamped to `[0, 0.99]`.
    pub fn set_feedback(&mut self, feedback: f64) {
        self.feedback = feedback.clamp(0.0, 0.99) as f32;
    }

    /// Lower bound for the per-cut delay in milliseconds.
    pub fn set_min_delay_ms(&mut self, ms: f64) {
        self.min_delay_ms = ms.clamp(0.0, MAX_DELAY_MS);
    }

    /// Upper bound for the per-cut delay in milliseconds.
    pub fn set_max_delay_ms(&mut self, ms: f64) {
        self.max_delay_ms = ms.clamp(0.0, MAX_DELAY_MS);
    }

    /// Restart the random sequence.
    pub fn reseed(&mut self, seed: u32) {
        self.rng.reseed(seed);
    }

    /// Draw a new delay time for the cut that just started.
    pub fn on_cut(&mut self) {
        let ms = self.rng.range_f64(self.min_delay_ms, self.max_delay_ms);
        self.set_delay_ms(ms);
    }

    /// Active delay in samples.
    pub fn delay_samples(&self) -> f32 {
        self.delay_samples
    }

    fn set_delay_ms(&mut self, ms: f64) {
        let max = (self.line_l.capacity() - 1) as f64;
        self.delay_samples = ms_to_samples(ms, self.sample_rate).clamp(1.0, max) as f32;
    }
}

impl StereoStage for CombStage {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        if !self.enabled {
            return (left, right);
        }

        let g = self.feedback;
        // read(d) is d samples behind the last write; the current input is
        // not written yet.
        let tap = self.delay_samples - 1.0;
        let delayed_l = self.line_l.read(tap);
        let delayed_r = self.line_r.read(tap);

        match self.comb_type {
            CombType::Feedback => {
                let y_l = flush_denormal(left + g * delayed_l);
                let y_r = flush_denormal(right + g * delayed_r);
                self.line_l.write(y_l);
                self.line_r.write(y_r);
                (y_l * (1.0 - g), y_r * (1.0 - g))
            }
            CombType::FeedForward => {
                self.line_l.write(left);
                self.line_r.write(right);
                let norm = 1.0 / (1.0 + g);
                ((left + g * delayed_l) * norm, (right + g * delayed_r) * norm)
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        let ms = f64::from(self.delay_samples) * 1000.0 / self.sample_rate;
        self.sample_rate = sample_rate;
        self.line_l.resize_for(sample_rate, MAX_DELAY_MS / 1000.0);
        self.line_r.resize_for(sample_rate, MAX_DELAY_MS / 1000.0);
        self.set_delay_ms(ms);
    }

    fn reset(&mut self) {
        self.line_l.clear();
        self.line_r.clear();
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse_response(comb: &mut CombStage, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| comb.process_stereo(if i == 0 { 1.0 } else { 0.0 }, 0.0).0)
            .collect()
    }

    fn comb_with_delay(comb_type: CombType, samples: f64) -> CombStage {
        // 1 kHz: one sample per millisecond.
        let mut comb = CombStage::new(1000.0);
        comb.set_enabled(true);
        comb.set_comb_type(comb_type);
        comb.set_feedback(0.5);
        comb.set_min_delay_ms(samples);
        comb.set_max_delay_ms(samples);
        comb.on_cut();
        comb
    }

    #[test]
    fn test_disabled_passthrough() {
        let mut comb = CombStage::new(44100.0);
        comb.set_feedback(0.9);
        assert_eq!(comb.process_stereo(0.5, -0.25), (0.5, -0.25));
    }

    #[test]
    fn test_feedforward_single_echo() {
        let mut comb = comb_with_delay(CombType::FeedForward, 4.0);
        let ir = impulse_response(&mut comb, 12);
        let norm = 1.0 / 1.5;
        assert!((ir[0] - norm).abs() < 1e-6);
        assert!((ir[4] - 0.5 * norm).abs() < 1e-6);
        assert!(ir[8].abs() < 1e-9, "feed-forward has one echo only");
    }

    #[test]
    fn test_feedback_repeats_decay() {
        let mut comb = comb_with_delay(CombType::Feedback, 4.0);
        let ir = impulse_response(&mut comb, 13);
        assert!((ir[0] - 0.5).abs() < 1e-6);
        assert!((ir[4] - 0.25).abs() < 1e-6);
        assert!((ir[8] - 0.125).abs() < 1e-6);
        assert!((ir[12] - 0.0625).abs() < 1e-6);
        assert_eq!(ir[2], 0.0);
    }

    #[test]
    fn test_dc_gain_unity() {
        for comb_type in [CombType::Feedback, CombType::FeedForward] {
            let mut comb = comb_with_delay(comb_type, 3.0);
            let mut out = 0.0;
            for _ in 0..2000 {
                out = comb.process_stereo(1.0, 1.0).0;
            }
            assert!((out - 1.0).abs() < 1e-4, "{comb_type:?}: {out}");
        }
    }

    #[test]
    fn test_on_cut_delay_in_range() {
        let mut comb = CombStage::new(48000.0);
        comb.set_min_delay_ms(1.0);
        comb.set_max_delay_ms(50.0);
        for _ in 0..100 {
            comb.on_cut();
            let d = comb.delay_samples();
            assert!((48.0..=2400.0).contains(&d), "{d}");
        }
    }

    #[test]
    fn test_sample_rate_change_keeps_time() {
        let mut comb = comb_with_delay(CombType::Feedback, 10.0);
        comb.set_sample_rate(2000.0);
        assert!((comb.delay_samples() - 20.0).abs() < 1e-4);
    }
}
