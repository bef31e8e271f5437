//! Live-input slice player.
//!
//! The player records every input sample into a ring buffer. A block marks
//! the current write position as its origin; each cut of the block restarts
//! playback from that origin, so the material heard at the block start is
//! repeated `cuts` times. Cut lengths form a geometric series with ratio
//! `ratio` that sums to the block length:
//!
//! ```text
//! first = length / cuts                         (ratio == 1)
//! first = length · (1 - ratio) / (1 - ratio^cuts) (otherwise)
//! next  = previous · ratio
//! ```
//!
//! Within a cut only the first `duty` fraction sounds, shaped by linear fades
//! of `fade` samples at both ends.

use alloc::vec;
use alloc::vec::Vec;
use libm::pow;

/// Seconds of input history kept for playback.
pub const HISTORY_SECONDS: f64 = 12.0;

/// Shape of one block, in samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockSpec {
    /// Block length in samples.
    pub length: f64,
    /// Number of cuts.
    pub cuts: u32,
    /// Length ratio between successive cuts.
    pub ratio: f64,
    /// Playback rate (1.0 = original pitch).
    pub rate: f64,
    /// Audible fraction of each cut.
    pub duty: f64,
    /// Fade length in samples.
    pub fade: f64,
}

impl BlockSpec {
    /// Length of the first cut.
    pub fn first_cut_length(&self) -> f64 {
        let cuts = self.cuts.max(1);
        if (self.ratio - 1.0).abs() < 1e-9 {
            self.length / f64::from(cuts)
        } else {
            self.length * (1.0 - self.ratio) / (1.0 - pow(self.ratio, f64::from(cuts)))
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveBlock {
    spec: BlockSpec,
    origin: usize,
    /// Samples elapsed since the block started.
    elapsed: usize,
    cuts_started: u32,
    next_cut_at: f64,
    next_cut_length: f64,
    cut: Option<ActiveCut>,
}

#[derive(Debug, Clone, Copy)]
struct ActiveCut {
    length: f64,
    elapsed: usize,
    offset: f64,
    gain_l: f32,
    gain_r: f32,
}

/// Ring-buffer recorder and cut player.
#[derive(Debug, Clone)]
pub struct LivePlayer {
    history_l: Vec<f32>,
    history_r: Vec<f32>,
    write_pos: usize,
    block: Option<ActiveBlock>,
}

impl LivePlayer {
    /// Allocate history for [`HISTORY_SECONDS`] at `sample_rate`.
    pub fn new(sample_rate: f64) -> Self {
        let capacity = Self::capacity_for(sample_rate);
        Self {
            history_l: vec![0.0; capacity],
            history_r: vec![0.0; capacity],
            write_pos: 0,
            block: None,
        }
    }

    fn capacity_for(sample_rate: f64) -> usize {
        ((sample_rate * HISTORY_SECONDS).max(0.0) as usize).max(2)
    }

    /// Reallocate the history for a new sample rate. Drops any active block.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        let capacity = Self::capacity_for(sample_rate);
        self.history_l = vec![0.0; capacity];
        self.history_r = vec![0.0; capacity];
        self.write_pos = 0;
        self.block = None;
    }

    /// Clear the history and drop any active block.
    pub fn reset(&mut self) {
        self.history_l.fill(0.0);
        self.history_r.fill(0.0);
        self.write_pos = 0;
        self.block = None;
    }

    /// History capacity in samples.
    pub fn capacity(&self) -> usize {
        self.history_l.len()
    }

    /// Begin a block at the current write position.
    pub fn start_block(&mut self, spec: BlockSpec) {
        self.block = Some(ActiveBlock {
            spec,
            origin: self.write_pos,
            elapsed: 0,
            cuts_started: 0,
            next_cut_at: 0.0,
            next_cut_length: spec.first_cut_length(),
            cut: None,
        });
    }

    /// Stop playing back; the input passes through again.
    pub fn release(&mut self) {
        self.block = None;
    }

    /// Whether a block is active.
    pub fn is_playing(&self) -> bool {
        self.block.is_some()
    }

    /// Whether the next cut of the active block starts at this sample.
    #[inline]
    pub fn cut_due(&self) -> bool {
        self.block.as_ref().is_some_and(|b| {
            b.cuts_started < b.spec.cuts.max(1) && b.elapsed as f64 >= b.next_cut_at
        })
    }

    /// Start the next cut with per-channel gains.
    pub fn start_cut(&mut self, gain_l: f32, gain_r: f32) {
        let Some(block) = self.block.as_mut() else {
            return;
        };
        let length = block.next_cut_length;
        block.cut = Some(ActiveCut {
            length,
            elapsed: 0,
            offset: 0.0,
            gain_l,
            gain_r,
        });
        block.cuts_started += 1;
        block.next_cut_at += length;
        block.next_cut_length = length * block.spec.ratio;
    }

    /// Record one input sample and produce one output sample.
    #[inline]
    pub fn tick(&mut self, left: f32, right: f32) -> (f32, f32) {
        let capacity = self.history_l.len();
        self.history_l[self.write_pos] = left;
        self.history_r[self.write_pos] = right;
        self.write_pos = (self.write_pos + 1) % capacity;

        let Some(block) = self.block.as_mut() else {
            return (left, right);
        };
        block.elapsed += 1;
        let Some(cut) = block.cut.as_mut() else {
            return (0.0, 0.0);
        };

        let gain = envelope(cut, &block.spec);
        // Never read past the newest recorded sample.
        let limit = (block.elapsed.min(capacity) - 1) as f64;
        let offset = cut.offset.min(limit);
        let out_l = read(&self.history_l, block.origin, offset);
        let out_r = read(&self.history_r, block.origin, offset);

        cut.offset += block.spec.rate;
        cut.elapsed += 1;
        (out_l * gain * cut.gain_l, out_r * gain * cut.gain_r)
    }
}

fn envelope(cut: &ActiveCut, spec: &BlockSpec) -> f32 {
    let sounding = cut.length * spec.duty.clamp(0.0, 1.0);
    let t = cut.elapsed as f64;
    let mut env: f64 = if spec.duty < 1.0 && t >= sounding { 0.0 } else { 1.0 };
    if spec.fade >= 1.0 {
        let fade_in = (t + 1.0) / spec.fade;
        let fade_out = ((sounding - t) / spec.fade).max(0.0);
        env = env.min(fade_in).min(fade_out);
    }
    env as f32
}

#[inline]
fn read(history: &[f32], origin: usize, offset: f64) -> f32 {
    let len = history.len();
    let whole = offset as usize;
    let frac = (offset - whole as f64) as f32;
    let a = history[(origin + whole) % len];
    if frac == 0.0 {
        return a;
    }
    let b = history[(origin + whole + 1) % len];
    a + (b - a) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(length: f64, cuts: u32) -> BlockSpec {
        BlockSpec {
            length,
            cuts,
            ratio: 1.0,
            rate: 1.0,
            duty: 1.0,
            fade: 0.0,
        }
    }

    /// Run a ramp through the player, starting cuts whenever due.
    fn run(player: &mut LivePlayer, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| {
                if player.cut_due() {
                    player.start_cut(1.0, 1.0);
                }
                player.tick(i as f32, i as f32).0
            })
            .collect()
    }

    #[test]
    fn test_passthrough_without_block() {
        let mut p = LivePlayer::new(1000.0);
        assert_eq!(p.tick(0.5, -0.5), (0.5, -0.5));
        assert!(!p.is_playing());
    }

    #[test]
    fn test_single_cut_is_live() {
        let mut p = LivePlayer::new(1000.0);
        p.start_block(spec(8.0, 1));
        let out = run(&mut p, 8);
        assert_eq!(out, (0..8).map(|i| i as f32).collect::<Vec<_>>());
    }

    #[test]
    fn test_cuts_repeat_block_start() {
        let mut p = LivePlayer::new(1000.0);
        p.tick(100.0, 100.0);
        p.start_block(spec(8.0, 2));
        let out = run(&mut p, 8);
        assert_eq!(out, vec![0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_geometric_lengths_sum_to_block() {
        let s = BlockSpec {
            ratio: 0.5,
            ..spec(15.0, 4)
        };
        assert!((s.first_cut_length() - 8.0).abs() < 1e-9);
        let mut p = LivePlayer::new(1000.0);
        p.start_block(s);
        let mut starts = Vec::new();
        for i in 0..15 {
            if p.cut_due() {
                starts.push(i);
                p.start_cut(1.0, 1.0);
            }
            p.tick(0.0, 0.0);
        }
        assert_eq!(starts, vec![0, 8, 12, 14]);
    }

    #[test]
    fn test_duty_gates_cut_tail() {
        let mut p = LivePlayer::new(1000.0);
        p.start_block(BlockSpec {
            duty: 0.5,
            ..spec(8.0, 1)
        });
        let out = run(&mut p, 8);
        assert_eq!(out, vec![0.0, 1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_fade_ramps() {
        let mut p = LivePlayer::new(1000.0);
        p.start_block(BlockSpec {
            fade: 2.0,
            ..spec(8.0, 1)
        });
        let gains: Vec<f32> = (0..8)
            .map(|_| {
                if p.cut_due() {
                    p.start_cut(1.0, 1.0);
                }
                p.tick(1.0, 1.0).0
            })
            .collect();
        assert_eq!(gains, vec![0.5, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.5]);
    }

    #[test]
    fn test_fast_rate_stays_on_recorded_material() {
        let mut p = LivePlayer::new(1000.0);
        p.start_block(BlockSpec {
            rate: 2.0,
            ..spec(8.0, 1)
        });
        let out = run(&mut p, 4);
        // The read head catches up with the write head and waits there.
        assert_eq!(out, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_cut_gains_applied() {
        let mut p = LivePlayer::new(1000.0);
        p.start_block(spec(4.0, 1));
        p.start_cut(0.5, 0.25);
        assert_eq!(p.tick(1.0, 1.0), (0.5, 0.25));
    }

    #[test]
    fn test_release_returns_to_passthrough() {
        let mut p = LivePlayer::new(1000.0);
        p.start_block(spec(4.0, 2));
        run(&mut p, 3);
        p.release();
        assert_eq!(p.tick(7.0, 7.0), (7.0, 7.0));
    }
}
