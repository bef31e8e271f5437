//! Cut stage: beat-synchronous slicing of the live input.
//!
//! The stage is told every grid cell boundary through
//! [`CutStage::set_position`]. Cells are grouped into phrases of a random
//! number of bars; a phrase is split into blocks by the selected
//! [`CutProc`], and each block is played back by the [`LivePlayer`] as a
//! number of cuts repeating the block's opening material.
//!
//! Randomness comes from the stage's own [`Rng`]: one seed always reproduces
//! the same pattern for the same transport.

mod player;
mod procs;

pub use player::{BlockSpec, HISTORY_SECONDS, LivePlayer};
pub use procs::{
    BlockPlan, CutProc, CutProc11Settings, CutSettings, SqPusherSettings, WarpCutSettings,
};

use chopshop_core::{
    GridPosition, Rng, StereoStage, TransportSnapshot, cents_to_ratio, ms_to_samples, pan_gains,
};

/// Slicing stage driven by grid positions.
///
/// # Example
///
/// ```rust
/// use chopshop_core::{GridPosition, StereoStage};
/// use chopshop_effects::CutStage;
///
/// let mut cut = CutStage::new(44100.0);
/// cut.set_position(GridPosition::new(0, 0));
/// cut.process_stereo(0.1, 0.1);
/// assert_eq!(cut.take_block_count(), 1);
/// assert_eq!(cut.take_cut_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct CutStage {
    player: LivePlayer,
    settings: CutSettings,
    proc: CutProc,
    rng: Rng,
    enabled: bool,
    sample_rate: f64,
    subdivision: u32,
    samples_per_cell: f64,
    position: Option<GridPosition>,
    phrase_cells: u32,
    phrase_left: u32,
    block_left: u32,
    cuts: u32,
    blocks: u32,
    cut_started: bool,
}

impl CutStage {
    /// Create the stage at 120 BPM 4/4 with eight cells per measure.
    /// Allocates the input history.
    pub fn new(sample_rate: f64) -> Self {
        let mut stage = Self {
            player: LivePlayer::new(sample_rate),
            settings: CutSettings::default(),
            proc: CutProc::default(),
            rng: Rng::default(),
            enabled: true,
            sample_rate,
            subdivision: 8,
            samples_per_cell: 0.0,
            position: None,
            phrase_cells: 0,
            phrase_left: 0,
            block_left: 0,
            cuts: 0,
            blocks: 0,
            cut_started: false,
        };
        stage.set_time_info(&TransportSnapshot::default());
        stage
    }

    /// Enable or disable. Disabled means passthrough; the input is still
    /// recorded.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Settings, read-only.
    pub fn settings(&self) -> &CutSettings {
        &self.settings
    }

    /// Settings, for the parameter setters. Changes apply from the next
    /// phrase, block or cut on.
    pub fn settings_mut(&mut self) -> &mut CutSettings {
        &mut self.settings
    }

    /// Selected cut procedure.
    pub fn cut_proc(&self) -> CutProc {
        self.proc
    }

    /// Select the cut procedure for the following blocks.
    pub fn set_cut_proc(&mut self, proc: CutProc) {
        self.proc = proc;
    }

    /// Cells per measure.
    pub fn subdivision(&self) -> u32 {
        self.subdivision
    }

    /// Change the cells per measure. The running phrase restarts at the next
    /// boundary.
    pub fn set_subdivision(&mut self, subdivision: u32) {
        let subdivision = subdivision.max(1);
        if subdivision != self.subdivision {
            self.subdivision = subdivision;
            self.position = None;
        }
    }

    /// Restart the random sequence.
    pub fn reseed(&mut self, seed: u32) {
        self.rng.reseed(seed);
    }

    /// Update the cell length from the block's tempo and meter.
    pub fn set_time_info(&mut self, transport: &TransportSnapshot) {
        if !transport.is_valid() {
            return;
        }
        let measure_quarters = transport.numerator * 4.0 / transport.denominator;
        let measure_samples = self.sample_rate * 60.0 / transport.tempo * measure_quarters;
        self.samples_per_cell = measure_samples / f64::from(self.subdivision);
    }

    /// Cell length in samples at the last reported tempo.
    pub fn samples_per_cell(&self) -> f64 {
        self.samples_per_cell
    }

    /// Notify a cell boundary (or a seek target).
    ///
    /// A position that does not directly follow the previous one starts a new
    /// phrase.
    pub fn set_position(&mut self, position: GridPosition) {
        let contiguous = self
            .position
            .is_some_and(|previous| previous.next(self.subdivision) == position);
        self.position = Some(position);
        if !contiguous {
            self.phrase_left = 0;
            self.block_left = 0;
        }

        if self.phrase_left == 0 {
            self.start_phrase(position);
        }
        if self.block_left == 0 {
            self.start_block();
        }
        self.block_left = self.block_left.saturating_sub(1);
        self.phrase_left = self.phrase_left.saturating_sub(1);
    }

    fn start_phrase(&mut self, position: GridPosition) {
        let s = &self.settings;
        let bars = self.rng.range_i32(s.min_phrase_bars, s.max_phrase_bars).max(1) as u32;
        let elapsed = position.position_in_measure.clamp(0, self.subdivision as i32 - 1) as u32;
        self.phrase_cells = bars * self.subdivision - elapsed;
        self.phrase_left = self.phrase_cells;
    }

    fn start_block(&mut self) {
        let plan = self
            .proc
            .plan_block(self.phrase_left, self.phrase_cells, &self.settings, &mut self.rng);
        let s = &self.settings;
        let cents = self.rng.range_f64(s.min_pitch_cents, s.max_pitch_cents);
        self.player.start_block(BlockSpec {
            length: f64::from(plan.cells) * self.samples_per_cell,
            cuts: plan.cuts,
            ratio: plan.ratio,
            rate: cents_to_ratio(cents),
            duty: if plan.fill { s.fill_duty } else { s.duty },
            fade: ms_to_samples(s.fade_ms, self.sample_rate),
        });
        self.block_left = plan.cells;
        self.blocks += 1;
    }

    /// Stop slicing: the active block is dropped and the next position starts
    /// a new phrase.
    pub fn release(&mut self) {
        self.player.release();
        self.position = None;
        self.phrase_left = 0;
        self.block_left = 0;
    }

    /// Cuts started since the last call; resets the counter.
    pub fn take_cut_count(&mut self) -> u32 {
        core::mem::take(&mut self.cuts)
    }

    /// Blocks started since the last call; resets the counter.
    pub fn take_block_count(&mut self) -> u32 {
        core::mem::take(&mut self.blocks)
    }

    /// Whether the last processed sample started a cut; resets the flag.
    pub fn take_cut_started(&mut self) -> bool {
        core::mem::take(&mut self.cut_started)
    }
}

impl StereoStage for CutStage {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        if self.enabled && self.player.cut_due() {
            let s = &self.settings;
            let amp = self.rng.range_f64(s.min_amp, s.max_amp) as f32;
            let pan = self.rng.range_f64(s.min_pan, s.max_pan) as f32;
            let (pan_l, pan_r) = pan_gains(pan);
            self.player.start_cut(amp * pan_l, amp * pan_r);
            self.cuts += 1;
            self.cut_started = true;
        }
        let out = self.player.tick(left, right);
        if self.enabled { out } else { (left, right) }
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        #[cfg(feature = "tracing")]
        tracing::debug!("cut_stage_sample_rate: {sample_rate} Hz");
        let scale = if self.sample_rate > 0.0 {
            sample_rate / self.sample_rate
        } else {
            0.0
        };
        self.sample_rate = sample_rate;
        self.samples_per_cell *= scale;
        self.player.set_sample_rate(sample_rate);
        self.position = None;
    }

    fn reset(&mut self) {
        self.player.reset();
        self.position = None;
        self.phrase_left = 0;
        self.block_left = 0;
        self.cuts = 0;
        self.blocks = 0;
        self.cut_started = false;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
