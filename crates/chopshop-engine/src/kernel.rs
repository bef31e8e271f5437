//! The real-time kernel: parameter setters and the block loop.
//!
//! [`Kernel`] owns the effect chain and the position tracker. Every setter
//! takes a native (already denormalized) value and is safe to call from the
//! audio thread. Only [`Kernel::set_sample_rate`] allocates.
//!
//! # Block Loop
//!
//! 1. Bypass: copy input to output, leave the grid untouched.
//! 2. Stopped transport: release the cut stage, run the chain on the live input.
//! 3. Playing: compute the block's grid walk, apply a forced seek, then per
//!    sample notify every new cell before running the chain.

use chopshop_core::{PositionTracker, StereoStage, TransportSnapshot, lerp};
use chopshop_effects::{CombType, CutProc, CutSettings, EffectChain};

use crate::params::ParameterId;

/// Absolute peak per channel over one block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Peak {
    /// Left channel peak.
    pub left: f32,
    /// Right channel peak.
    pub right: f32,
}

impl Peak {
    /// Peak of a pair of buffers.
    pub fn of(left: &[f32], right: &[f32]) -> Self {
        let max_abs = |buf: &[f32]| buf.iter().fold(0.0f32, |m, x| m.max(x.abs()));
        Self {
            left: max_abs(left),
            right: max_abs(right),
        }
    }

    /// Both channels exactly silent.
    pub fn is_silent(&self) -> bool {
        self.left <= 0.0 && self.right <= 0.0
    }

    #[inline]
    fn track(&mut self, left: f32, right: f32) {
        self.left = self.left.max(left.abs());
        self.right = self.right.max(right.abs());
    }
}

/// Audio-thread engine state.
#[derive(Debug, Clone)]
pub struct Kernel {
    chain: EffectChain,
    tracker: PositionTracker,
    sample_rate: f64,
    bypass: bool,
    crusher_min_freq: f64,
    crusher_max_freq: f64,
}

impl Kernel {
    /// Create a kernel with every stage at its default settings.
    pub fn new(sample_rate: f64) -> Self {
        let mut kernel = Self {
            chain: EffectChain::new(sample_rate),
            tracker: PositionTracker::new(6, sample_rate),
            sample_rate,
            bypass: false,
            crusher_min_freq: 0.5,
            crusher_max_freq: 0.5,
        };
        kernel.set_subdivision(6);
        kernel.update_crusher_freqs();
        kernel
    }

    /// Change the sample rate. Reallocates stage buffers: control thread
    /// only, with audio stopped.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        tracing::info!(sample_rate, "kernel sample rate");
        self.sample_rate = sample_rate;
        self.chain.set_sample_rate(sample_rate);
        self.tracker.set_sample_rate(sample_rate);
        self.tracker.release();
        self.update_crusher_freqs();
    }

    /// Current sample rate.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Effect chain, read-only.
    pub fn chain(&self) -> &EffectChain {
        &self.chain
    }

    /// Position tracker, read-only.
    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    /// Whether the kernel is bypassed.
    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    /// Clear all stage state.
    pub fn reset(&mut self) {
        self.chain.reset();
        self.tracker.release();
    }

    /// Apply one native value through the setter owning `id`.
    ///
    /// Read-only statistics have no setter and are ignored.
    pub fn set_parameter(&mut self, id: ParameterId, native: f64) {
        use ParameterId as P;
        match id {
            P::CutProc => self.set_cut_proc(CutProc::from_index(native as i32)),
            P::SubDiv => self.set_subdivision(native as u32),
            P::Seed => self.set_seed(native as u32),
            P::Fade => self.set_fade_ms(native),
            P::MinAmp => self.set_min_amp(native),
            P::MaxAmp => self.set_max_amp(native),
            P::MinPan => self.set_min_pan(native),
            P::MaxPan => self.set_max_pan(native),
            P::MinPitch => self.set_min_pitch(native),
            P::MaxPitch => self.set_max_pitch(native),
            P::Duty => self.set_duty(native),
            P::FillDuty => self.set_fill_duty(native),
            P::MinPhrase => self.set_min_phrase(native as i32),
            P::MaxPhrase => self.set_max_phrase(native as i32),
            P::MinRepeat => self.set_min_repeat(native as i32),
            P::MaxRepeat => self.set_max_repeat(native as i32),
            P::Stutter => self.set_stutter(native),
            P::Area => self.set_area(native),
            P::Straight => self.set_straight(native),
            P::Regular => self.set_regular(native),
            P::Ritard => self.set_ritard(native),
            P::Speed => self.set_speed(native),
            P::Activity => self.set_activity(native),
            P::Crusher => self.set_crusher(native >= 0.5),
            P::CrusherMinBits => self.set_crusher_min_bits(native as i32),
            P::CrusherMaxBits => self.set_crusher_max_bits(native as i32),
            P::CrusherMinFreq => self.set_crusher_min_freq(native),
            P::CrusherMaxFreq => self.set_crusher_max_freq(native),
            P::Comb => self.set_comb(native >= 0.5),
            P::CombType => self.set_comb_type(if native >= 0.5 {
                CombType::FeedForward
            } else {
                CombType::Feedback
            }),
            P::CombFeedback => self.set_comb_feedback(native),
            P::CombMinDelay => self.set_comb_min_delay(native),
            P::CombMaxDelay => self.set_comb_max_delay(native),
            P::Bypass => self.set_bypass(native >= 0.5),
            P::CutCount | P::BlockCount => {}
        }
    }

    /// Apply a normalized value, denormalizing through the parameter table.
    #[inline]
    pub fn set_normalized(&mut self, id: ParameterId, normalized: f64) {
        self.set_parameter(id, id.descriptor().to_native(normalized));
    }

    fn settings(&mut self) -> &mut CutSettings {
        self.chain.cut_mut().settings_mut()
    }

    /// Select the cut procedure.
    pub fn set_cut_proc(&mut self, proc: CutProc) {
        self.chain.cut_mut().set_cut_proc(proc);
    }

    /// Cells per measure.
    pub fn set_subdivision(&mut self, cells: u32) {
        let cells = cells.max(1);
        self.tracker.set_subdivision(cells);
        self.chain.cut_mut().set_subdivision(cells);
    }

    /// Reseed every stage's generator.
    pub fn set_seed(&mut self, seed: u32) {
        self.chain.reseed(seed);
    }

    /// Cut fade length in milliseconds.
    pub fn set_fade_ms(&mut self, ms: f64) {
        self.settings().fade_ms = ms.max(0.0);
    }

    /// Lower cut amplitude.
    pub fn set_min_amp(&mut self, amp: f64) {
        self.settings().min_amp = amp;
    }

    /// Upper cut amplitude.
    pub fn set_max_amp(&mut self, amp: f64) {
        self.settings().max_amp = amp;
    }

    /// Lower cut pan in \[-1, 1\].
    pub fn set_min_pan(&mut self, pan: f64) {
        self.settings().min_pan = pan;
    }

    /// Upper cut pan in \[-1, 1\].
    pub fn set_max_pan(&mut self, pan: f64) {
        self.settings().max_pan = pan;
    }

    /// Lower block detune in cents.
    pub fn set_min_pitch(&mut self, cents: f64) {
        self.settings().min_pitch_cents = cents;
    }

    /// Upper block detune in cents.
    pub fn set_max_pitch(&mut self, cents: f64) {
        self.settings().max_pitch_cents = cents;
    }

    /// Audible fraction of regular cuts.
    pub fn set_duty(&mut self, duty: f64) {
        self.settings().duty = duty;
    }

    /// Audible fraction of fill cuts.
    pub fn set_fill_duty(&mut self, duty: f64) {
        self.settings().fill_duty = duty;
    }

    /// Shortest phrase in bars.
    pub fn set_min_phrase(&mut self, bars: i32) {
        self.settings().min_phrase_bars = bars;
    }

    /// Longest phrase in bars.
    pub fn set_max_phrase(&mut self, bars: i32) {
        self.settings().max_phrase_bars = bars;
    }

    /// CutProc11 minimum extra repeats.
    pub fn set_min_repeat(&mut self, repeats: i32) {
        self.settings().cut_proc11.min_repeat = repeats;
    }

    /// CutProc11 maximum extra repeats.
    pub fn set_max_repeat(&mut self, repeats: i32) {
        self.settings().cut_proc11.max_repeat = repeats;
    }

    /// CutProc11 stutter probability.
    pub fn set_stutter(&mut self, chance: f64) {
        self.settings().cut_proc11.stutter_chance = chance;
    }

    /// CutProc11 stutter area (fraction of the phrase).
    pub fn set_area(&mut self, area: f64) {
        self.settings().cut_proc11.stutter_area = area;
    }

    /// WarpCut straight-block probability.
    pub fn set_straight(&mut self, chance: f64) {
        self.settings().warp_cut.straight_chance = chance;
    }

    /// WarpCut even-roll probability.
    pub fn set_regular(&mut self, chance: f64) {
        self.settings().warp_cut.regular_chance = chance;
    }

    /// WarpCut ritardando probability.
    pub fn set_ritard(&mut self, chance: f64) {
        self.settings().warp_cut.ritard_chance = chance;
    }

    /// WarpCut roll ratio.
    pub fn set_speed(&mut self, speed: f64) {
        self.settings().warp_cut.speed = speed;
    }

    /// SQPusher fill probability.
    pub fn set_activity(&mut self, chance: f64) {
        self.settings().sq_pusher.activity = chance;
    }

    /// Enable the bit crusher.
    pub fn set_crusher(&mut self, enabled: bool) {
        self.chain.crusher_mut().set_enabled(enabled);
    }

    /// Lowest crusher bit depth.
    pub fn set_crusher_min_bits(&mut self, bits: i32) {
        self.chain.crusher_mut().set_min_bits(bits);
    }

    /// Highest crusher bit depth.
    pub fn set_crusher_max_bits(&mut self, bits: i32) {
        self.chain.crusher_mut().set_max_bits(bits);
    }

    /// Lowest crusher hold frequency, as a fraction between `sr / 100` and `sr`.
    pub fn set_crusher_min_freq(&mut self, amount: f64) {
        self.crusher_min_freq = amount;
        self.update_crusher_freqs();
    }

    /// Highest crusher hold frequency, as a fraction between `sr / 100` and `sr`.
    pub fn set_crusher_max_freq(&mut self, amount: f64) {
        self.crusher_max_freq = amount;
        self.update_crusher_freqs();
    }

    fn update_crusher_freqs(&mut self) {
        let sr = self.sample_rate;
        let min = lerp(sr / 100.0, sr, self.crusher_min_freq);
        let max = lerp(sr / 100.0, sr, self.crusher_max_freq);
        self.chain.crusher_mut().set_freq_range(min, max);
    }

    /// Enable the comb.
    pub fn set_comb(&mut self, enabled: bool) {
        self.chain.comb_mut().set_enabled(enabled);
    }

    /// Comb topology.
    pub fn set_comb_type(&mut self, comb_type: CombType) {
        self.chain.comb_mut().set_comb_type(comb_type);
    }

    /// Comb feedback gain.
    pub fn set_comb_feedback(&mut self, feedback: f64) {
        self.chain.comb_mut().set_feedback(feedback);
    }

    /// Shortest comb delay in milliseconds.
    pub fn set_comb_min_delay(&mut self, ms: f64) {
        self.chain.comb_mut().set_min_delay_ms(ms);
    }

    /// Longest comb delay in milliseconds.
    pub fn set_comb_max_delay(&mut self, ms: f64) {
        self.chain.comb_mut().set_max_delay_ms(ms);
    }

    /// Skip the whole chain.
    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    /// Cuts started since the last call.
    pub fn take_cut_count(&mut self) -> u32 {
        self.chain.cut_mut().take_cut_count()
    }

    /// Blocks started since the last call.
    pub fn take_block_count(&mut self) -> u32 {
        self.chain.cut_mut().take_block_count()
    }

    /// Process one block. The block length is the shortest of the four
    /// buffers; an empty block does nothing.
    pub fn process(
        &mut self,
        inputs: [&[f32]; 2],
        outputs: [&mut [f32]; 2],
        transport: &TransportSnapshot,
    ) -> Peak {
        let [in_l, in_r] = inputs;
        let [out_l, out_r] = outputs;
        let n = in_l.len().min(in_r.len()).min(out_l.len()).min(out_r.len());
        if n == 0 {
            return Peak::default();
        }
        let (in_l, in_r) = (&in_l[..n], &in_r[..n]);
        let (out_l, out_r) = (&mut out_l[..n], &mut out_r[..n]);

        if self.bypass {
            out_l.copy_from_slice(in_l);
            out_r.copy_from_slice(in_r);
            return Peak::of(in_l, in_r);
        }

        self.chain.set_time_info(transport);
        let grid = if transport.playing {
            self.tracker.begin_block(n, transport)
        } else {
            None
        };
        let Some(mut grid) = grid else {
            self.tracker.release();
            self.chain.release();
            let mut peak = Peak::default();
            for i in 0..n {
                let (l, r) = self.chain.process_stereo(in_l[i], in_r[i]);
                out_l[i] = l;
                out_r[i] = r;
                peak.track(l, r);
            }
            return peak;
        };

        if let Some(target) = grid.seek() {
            self.chain.set_position(target);
        }

        let mut peak = Peak::default();
        for i in 0..n {
            if let Some(position) = self.tracker.advance(&mut grid) {
                self.chain.set_position(position);
            }
            let (l, r) = self.chain.process_stereo(in_l[i], in_r[i]);
            out_l[i] = l;
            out_r[i] = r;
            peak.track(l, r);
        }
        peak
    }
}
