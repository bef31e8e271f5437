//! Fixed-order effect chain: cut → bit crusher → comb.
//!
//! The chain composition never changes, so the stages are plain fields
//! called in order. A cut started by the cut stage re-randomizes the crusher
//! and comb before they process the same sample.

use crate::{BitCrusher, CombStage, CutStage};
use chopshop_core::{GridPosition, StereoStage, TransportSnapshot};

/// Seeds of the crusher and comb generators, derived from the chain seed.
#[inline]
fn stage_seed(seed: u32, stage: u32) -> u32 {
    seed.wrapping_mul(0x9E37_79B9).wrapping_add(stage)
}

/// The three stages in processing order.
///
/// # Example
///
/// ```rust
/// use chopshop_core::{GridPosition, StereoStage};
/// use chopshop_effects::EffectChain;
///
/// let mut chain = EffectChain::new(44100.0);
/// chain.cut_mut().settings_mut().min_pan = 0.0;
/// chain.cut_mut().settings_mut().max_pan = 0.0;
/// chain.crusher_mut().set_enabled(true);
/// chain.crusher_mut().set_bit_range(4, 4);
/// chain.set_position(GridPosition::new(0, 0));
/// let (l, _) = chain.process_stereo(0.3, 0.3);
/// assert_eq!(l, 0.3125);
/// ```
#[derive(Debug, Clone)]
pub struct EffectChain {
    cut: CutStage,
    crusher: BitCrusher,
    comb: CombStage,
}

impl EffectChain {
    /// Create the chain. Crusher and comb start disabled.
    pub fn new(sample_rate: f64) -> Self {
        let mut chain = Self {
            cut: CutStage::new(sample_rate),
            crusher: BitCrusher::new(sample_rate),
            comb: CombStage::new(sample_rate),
        };
        chain.reseed(1);
        chain
    }

    /// Cut stage.
    pub fn cut(&self) -> &CutStage {
        &self.cut
    }

    /// Cut stage, mutable.
    pub fn cut_mut(&mut self) -> &mut CutStage {
        &mut self.cut
    }

    /// Bit crusher.
    pub fn crusher(&self) -> &BitCrusher {
        &self.crusher
    }

    /// Bit crusher, mutable.
    pub fn crusher_mut(&mut self) -> &mut BitCrusher {
        &mut self.crusher
    }

    /// Comb.
    pub fn comb(&self) -> &CombStage {
        &self.comb
    }

    /// Comb, mutable.
    pub fn comb_mut(&mut self) -> &mut CombStage {
        &mut self.comb
    }

    /// Reseed every stage's generator.
    pub fn reseed(&mut self, seed: u32) {
        self.cut.reseed(seed);
        self.crusher.reseed(stage_seed(seed, 1));
        self.comb.reseed(stage_seed(seed, 2));
    }

    /// Forward the block's tempo and meter to the cut stage.
    pub fn set_time_info(&mut self, transport: &TransportSnapshot) {
        self.cut.set_time_info(transport);
    }

    /// Forward a cell boundary to the cut stage.
    #[inline]
    pub fn set_position(&mut self, position: GridPosition) {
        self.cut.set_position(position);
    }

    /// Stop slicing until the next position arrives.
    pub fn release(&mut self) {
        self.cut.release();
    }
}

impl StereoStage for EffectChain {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let (l, r) = self.cut.process_stereo(left, right);
        if self.cut.take_cut_started() {
            self.crusher.on_cut();
            self.comb.on_cut();
        }
        let (l, r) = self.crusher.process_stereo(l, r);
        self.comb.process_stereo(l, r)
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.cut.set_sample_rate(sample_rate);
        self.crusher.set_sample_rate(sample_rate);
        self.comb.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.cut.reset();
        self.crusher.reset();
        self.comb.reset();
    }

    fn is_enabled(&self) -> bool {
        self.cut.is_enabled() || self.crusher.is_enabled() || self.comb.is_enabled()
    }
}
