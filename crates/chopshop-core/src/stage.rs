//! The per-sample stereo stage contract.
//!
//! Every stage of the effect chain consumes one stereo sample pair and
//! produces one, keeping its own state between calls. The chain is a fixed
//! set of concrete types called in a fixed order, so the trait is used with
//! static dispatch; it stays object-safe for tests and tooling.
//!
//! No method may allocate except [`StereoStage::set_sample_rate`], which is
//! only called from the control thread while audio is stopped.

/// A stereo audio stage.
///
/// # Example
///
/// ```rust
/// use chopshop_core::StereoStage;
///
/// struct Swap;
///
/// impl StereoStage for Swap {
///     fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
///         (right, left)
///     }
///     fn set_sample_rate(&mut self, _sample_rate: f64) {}
///     fn reset(&mut self) {}
/// }
///
/// let mut stage = Swap;
/// assert_eq!(stage.process_stereo(1.0, 0.0), (0.0, 1.0));
/// ```
pub trait StereoStage {
    /// Process one stereo sample pair.
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32);

    /// Process a block of stereo samples.
    ///
    /// All four slices must have the same length; the shortest wins otherwise.
    fn process_block_stereo(
        &mut self,
        left_in: &[f32],
        right_in: &[f32],
        left_out: &mut [f32],
        right_out: &mut [f32],
    ) {
        debug_assert_eq!(left_in.len(), left_out.len());
        debug_assert_eq!(right_in.len(), right_out.len());
        let frames = left_in
            .iter()
            .zip(right_in)
            .zip(left_out.iter_mut().zip(right_out.iter_mut()));
        for ((&l, &r), (out_l, out_r)) in frames {
            (*out_l, *out_r) = self.process_stereo(l, r);
        }
    }

    /// Update the sample rate. May reallocate internal buffers.
    fn set_sample_rate(&mut self, sample_rate: f64);

    /// Clear internal state (buffers, counters) without touching settings.
    fn reset(&mut self);

    /// Whether the stage currently alters the signal.
    fn is_enabled(&self) -> bool {
        true
    }
}
