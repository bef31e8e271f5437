//! Transport-to-grid mapping.
//!
//! The cut grid divides every measure into `subdivision` equal cells. A grid
//! position is a real number of cells since the song start; its integer parts
//! give a [`GridPosition`] (measure index and cell within the measure).
//!
//! [`PositionTracker`] turns one [`TransportSnapshot`] per block into a start
//! position and a per-sample increment, then walks the block sample by sample
//! and reports each cell boundary exactly once.
//!
//! ```text
//! cells_per_beat   = subdivision / numerator
//! quarters_block   = (num_samples / sample_rate) * (tempo / 60)
//! increment        = cells_per_beat * quarters_block * (denominator / 4) / num_samples
//! start            = cells_per_beat * ppq_position * (denominator / 4)
//! ```
//!
//! # Example
//!
//! ```rust
//! use chopshop_core::{PositionTracker, TransportSnapshot};
//!
//! let mut tracker = PositionTracker::new(8, 44100.0);
//! let transport = TransportSnapshot::playing(120.0, 0.0);
//! let mut grid = tracker.begin_block(1024, &transport).unwrap();
//! assert!((grid.increment() * 1024.0 - 0.9288).abs() < 1e-4);
//!
//! let first = tracker.advance(&mut grid).unwrap();
//! assert_eq!((first.measure, first.position_in_measure), (0, 0));
//! ```

use crate::transport::TransportSnapshot;
use libm::floor;

/// Host positions less than this many cells past the predicted block start
/// are treated as continuous playback. Positions behind the prediction always
/// are, unless the transport reports a discontinuity.
const CONTINUITY_EPSILON: f64 = 1e-6;

/// Measure index and cell within the measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridPosition {
    /// Measure index (negative during pre-roll).
    pub measure: i32,
    /// Cell within the measure, in `[0, subdivision)`.
    pub position_in_measure: i32,
}

impl GridPosition {
    /// Construct from parts.
    pub const fn new(measure: i32, position_in_measure: i32) -> Self {
        Self {
            measure,
            position_in_measure,
        }
    }

    /// Split a running grid position into measure and cell.
    #[inline]
    pub fn from_grid(position: f64, subdivision: u32) -> Self {
        let cells = f64::from(subdivision.max(1));
        let measure = floor(position / cells);
        // Tiny negative positions can round up to `cells`.
        let cell = floor(position - measure * cells).clamp(0.0, cells - 1.0);
        Self {
            measure: measure as i32,
            position_in_measure: cell as i32,
        }
    }

    /// The cell after this one.
    pub fn next(self, subdivision: u32) -> Self {
        if self.position_in_measure + 1 >= subdivision as i32 {
            Self::new(self.measure + 1, 0)
        } else {
            Self::new(self.measure, self.position_in_measure + 1)
        }
    }
}

/// Grid walk state for one block, produced by [`PositionTracker::begin_block`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockGrid {
    start: f64,
    increment: f64,
    index: u32,
    seek: Option<GridPosition>,
}

impl BlockGrid {
    /// Running grid position (cells since song start).
    ///
    /// Computed from the block start rather than accumulated, so it never
    /// drifts and the next block continues exactly where this one ends.
    #[inline]
    pub fn position(&self) -> f64 {
        self.start + f64::from(self.index) * self.increment
    }

    /// Grid delta per sample.
    pub fn increment(&self) -> f64 {
        self.increment
    }

    /// Forced seek target when the host reported a jump while playing.
    pub fn seek(&self) -> Option<GridPosition> {
        self.seek
    }
}

/// Maps host transport to the cut grid and detects cell boundaries.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    subdivision: u32,
    sample_rate: f64,
    last_cell: Option<i32>,
    expected_start: Option<f64>,
}

impl PositionTracker {
    /// Create a tracker for `subdivision` cells per measure.
    pub fn new(subdivision: u32, sample_rate: f64) -> Self {
        Self {
            subdivision: subdivision.max(1),
            sample_rate,
            last_cell: None,
            expected_start: None,
        }
    }

    /// Cells per measure.
    pub fn subdivision(&self) -> u32 {
        self.subdivision
    }

    /// Change the cells per measure.
    pub fn set_subdivision(&mut self, subdivision: u32) {
        self.subdivision = subdivision.max(1);
        self.expected_start = None;
    }

    /// Change the sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        #[cfg(feature = "tracing")]
        tracing::debug!("tracker_sample_rate: {sample_rate} Hz");
        self.sample_rate = sample_rate;
        self.expected_start = None;
    }

    /// Cell reported most recently.
    pub fn last_cell(&self) -> Option<i32> {
        self.last_cell
    }

    /// Forget the last reported cell, so the next walked sample reports.
    pub fn release(&mut self) {
        self.last_cell = None;
        self.expected_start = None;
    }

    /// Compute the grid walk for a block.
    ///
    /// Returns `None` for an empty block or an unusable transport. When the
    /// transport reports a discontinuity while playing, the returned grid
    /// carries a seek target and that cell counts as already reported.
    /// Without a discontinuity the grid never moves backwards: a host
    /// position behind the end of the previous block continues from there.
    pub fn begin_block(&mut self, num_samples: usize, transport: &TransportSnapshot) -> Option<BlockGrid> {
        if num_samples == 0 || !transport.is_valid() || self.sample_rate <= 0.0 {
            return None;
        }

        let samples = num_samples as f64;
        let cells_per_beat = f64::from(self.subdivision) / transport.numerator;
        let meter = transport.denominator / 4.0;
        let increment =
            cells_per_beat * transport.quarter_notes(num_samples, self.sample_rate) * meter / samples;
        let mut start = cells_per_beat * transport.ppq_position * meter;

        if !transport.discontinuity
            && let Some(expected) = self.expected_start
            && start - expected < CONTINUITY_EPSILON
        {
            start = expected;
        }

        let seek = (transport.discontinuity && transport.playing)
            .then(|| GridPosition::from_grid(start, self.subdivision));
        if let Some(target) = seek {
            self.last_cell = Some(target.position_in_measure);
        }

        self.expected_start = Some(start + increment * samples);
        Some(BlockGrid {
            start,
            increment,
            index: 0,
            seek,
        })
    }

    /// Position of the current sample, then step to the next.
    ///
    /// Returns the position only when its cell differs from the last
    /// reported one.
    #[inline]
    pub fn advance(&mut self, grid: &mut BlockGrid) -> Option<GridPosition> {
        let current = GridPosition::from_grid(grid.position(), self.subdivision);
        grid.index += 1;
        if self.last_cell == Some(current.position_in_measure) {
            return None;
        }
        self.last_cell = Some(current.position_in_measure);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use alloc::vec::Vec;

    const SR: f64 = 44100.0;

    fn walk(tracker: &mut PositionTracker, transport: &TransportSnapshot, n: usize) -> Vec<GridPosition> {
        let Some(mut grid) = tracker.begin_block(n, transport) else {
            return Vec::new();
        };
        (0..n).filter_map(|_| tracker.advance(&mut grid)).collect()
    }

    #[test]
    fn test_from_grid() {
        assert_eq!(GridPosition::from_grid(0.0, 8), GridPosition::new(0, 0));
        assert_eq!(GridPosition::from_grid(7.99, 8), GridPosition::new(0, 7));
        assert_eq!(GridPosition::from_grid(8.0, 8), GridPosition::new(1, 0));
        assert_eq!(GridPosition::from_grid(19.5, 8), GridPosition::new(2, 3));
        assert_eq!(GridPosition::from_grid(-0.5, 8), GridPosition::new(-1, 7));
        assert_eq!(GridPosition::from_grid(-1e-17, 8), GridPosition::new(-1, 7));
    }

    #[test]
    fn test_next_wraps_measure() {
        assert_eq!(GridPosition::new(0, 6).next(8), GridPosition::new(0, 7));
        assert_eq!(GridPosition::new(0, 7).next(8), GridPosition::new(1, 0));
    }

    #[test]
    fn test_increment_scenario() {
        let mut tracker = PositionTracker::new(8, SR);
        let t = TransportSnapshot::playing(120.0, 0.0);
        let grid = tracker.begin_block(1024, &t).unwrap();
        let per_block = grid.increment() * 1024.0;
        let expected = 8.0 / 4.0 * (1024.0 / SR) * (120.0 / 60.0);
        assert!((per_block - expected).abs() < 1e-12);
        assert!((per_block - 0.9288).abs() < 1e-4);
    }

    #[test]
    fn test_start_from_ppq() {
        let mut tracker = PositionTracker::new(8, SR);
        // Bar 2 beat 1 in 4/4: ppq 4 = cell 8 = measure 1, cell 0.
        let t = TransportSnapshot::playing(120.0, 4.0);
        let grid = tracker.begin_block(64, &t).unwrap();
        assert_eq!(grid.position(), 8.0);
    }

    #[test]
    fn test_compound_meter() {
        let mut tracker = PositionTracker::new(6, SR);
        // 6/8: one measure is three quarter notes.
        let t = TransportSnapshot {
            numerator: 6.0,
            denominator: 8.0,
            ..TransportSnapshot::playing(120.0, 3.0)
        };
        let grid = tracker.begin_block(64, &t).unwrap();
        assert_eq!(GridPosition::from_grid(grid.position(), 6), GridPosition::new(1, 0));
    }

    #[test]
    fn test_empty_block() {
        let mut tracker = PositionTracker::new(8, SR);
        assert!(tracker.begin_block(0, &TransportSnapshot::playing(120.0, 0.0)).is_none());
    }

    #[test]
    fn test_each_cell_reported_once() {
        let mut tracker = PositionTracker::new(8, SR);
        let mut ppq = 0.0;
        let mut seen = Vec::new();
        // Two measures at 120 BPM = 4 seconds.
        for _ in 0..(4 * 44100 / 1024) {
            let t = TransportSnapshot::playing(120.0, ppq);
            seen.extend(walk(&mut tracker, &t, 1024));
            ppq += t.quarter_notes(1024, SR);
        }
        let cells: Vec<i32> = seen.iter().map(|p| p.position_in_measure).collect();
        let expected: Vec<i32> = (0..16).map(|i| i % 8).collect();
        assert_eq!(cells[..16], expected[..]);
        for pair in seen.windows(2) {
            assert_eq!(pair[0].next(8), pair[1]);
        }
    }

    #[test]
    fn test_seek_marks_cell_reported() {
        let mut tracker = PositionTracker::new(8, SR);
        let t = TransportSnapshot {
            discontinuity: true,
            ..TransportSnapshot::playing(120.0, 2.0)
        };
        let mut grid = tracker.begin_block(16, &t).unwrap();
        assert_eq!(grid.seek(), Some(GridPosition::new(0, 4)));
        // The seek already delivered cell 4.
        assert_eq!(tracker.advance(&mut grid), None);
    }

    #[test]
    fn test_backward_drift_does_not_repeat_cells() {
        let mut tracker = PositionTracker::new(8, SR);
        // Cell 1 starts at sample 11025; stop two samples later.
        let first = TransportSnapshot::playing(120.0, 0.0);
        let mut cells: Vec<i32> = walk(&mut tracker, &first, 11027)
            .iter()
            .map(|p| p.position_in_measure)
            .collect();

        // Host reports the next block slightly behind where this one ended.
        let drifted = first.quarter_notes(11027, SR) - 0.002;
        let second = TransportSnapshot::playing(120.0, drifted);
        cells.extend(walk(&mut tracker, &second, 1024).iter().map(|p| p.position_in_measure));
        assert_eq!(cells, [0, 1]);
    }

    #[test]
    fn test_forward_drift_follows_host() {
        let mut tracker = PositionTracker::new(8, SR);
        let t = TransportSnapshot::playing(120.0, 0.0);
        walk(&mut tracker, &t, 64);
        let ahead = TransportSnapshot::playing(120.0, 0.6);
        let grid = tracker.begin_block(64, &ahead).unwrap();
        assert!((grid.position() - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_no_seek_when_stopped() {
        let mut tracker = PositionTracker::new(8, SR);
        let t = TransportSnapshot {
            discontinuity: true,
            ..TransportSnapshot::default()
        };
        let grid = tracker.begin_block(16, &t).unwrap();
        assert_eq!(grid.seek(), None);
    }

    #[test]
    fn test_release_reports_again() {
        let mut tracker = PositionTracker::new(8, SR);
        let t = TransportSnapshot::playing(120.0, 0.0);
        assert_eq!(walk(&mut tracker, &t, 16).len(), 1);
        assert_eq!(walk(&mut tracker, &t, 16).len(), 0);
        tracker.release();
        assert_eq!(walk(&mut tracker, &t, 16).len(), 1);
    }
}
