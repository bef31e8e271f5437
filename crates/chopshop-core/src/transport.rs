//! Host transport snapshots and jump detection.
//!
//! A [`TransportSnapshot`] is what the host tells the engine at the start of
//! each audio block: tempo, time signature, musical position and the
//! playing/discontinuity flags. Many hosts never set the discontinuity flag,
//! so [`TransportWatcher`] derives one by comparing the reported position with
//! the position predicted from the previous block.

/// Host transport state for one audio block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportSnapshot {
    /// Tempo in beats (quarter notes) per minute.
    pub tempo: f64,
    /// Time signature numerator.
    pub numerator: f64,
    /// Time signature denominator.
    pub denominator: f64,
    /// Musical position at the block start, in quarter notes.
    pub ppq_position: f64,
    /// Whether the transport is rolling.
    pub playing: bool,
    /// Whether the position jumped since the previous block.
    pub discontinuity: bool,
}

impl Default for TransportSnapshot {
    fn default() -> Self {
        Self {
            tempo: 120.0,
            numerator: 4.0,
            denominator: 4.0,
            ppq_position: 0.0,
            playing: false,
            discontinuity: false,
        }
    }
}

impl TransportSnapshot {
    /// A rolling transport at `tempo` in 4/4 from `ppq_position`.
    pub fn playing(tempo: f64, ppq_position: f64) -> Self {
        Self {
            tempo,
            ppq_position,
            playing: true,
            ..Self::default()
        }
    }

    /// Quarter notes covered by `num_samples` at `sample_rate`.
    #[inline]
    pub fn quarter_notes(&self, num_samples: usize, sample_rate: f64) -> f64 {
        (num_samples as f64 / sample_rate) * (self.tempo / 60.0)
    }

    /// Whether tempo and time signature are usable for grid math.
    pub fn is_valid(&self) -> bool {
        self.tempo > 0.0
            && self.numerator > 0.0
            && self.denominator > 0.0
            && self.tempo.is_finite()
            && self.ppq_position.is_finite()
    }
}

/// Flags position jumps the host did not report.
///
/// A jump is either the transport starting to play, or a reported position
/// further than `tolerance` quarter notes from the position predicted by the
/// previous block.
#[derive(Debug, Clone)]
pub struct TransportWatcher {
    expected_ppq: Option<f64>,
    was_playing: bool,
    tolerance: f64,
}

impl TransportWatcher {
    /// Create a watcher accepting `tolerance` quarter notes of drift.
    pub fn new(tolerance: f64) -> Self {
        Self {
            expected_ppq: None,
            was_playing: false,
            tolerance,
        }
    }

    /// Inspect one block's snapshot, setting `discontinuity` on a jump.
    pub fn observe(&mut self, transport: &mut TransportSnapshot, num_samples: usize, sample_rate: f64) {
        let jumped = match self.expected_ppq {
            Some(expected) if transport.playing => {
                (transport.ppq_position - expected).abs() > self.tolerance
            }
            _ => transport.playing && !self.was_playing,
        };
        transport.discontinuity |= jumped;

        self.was_playing = transport.playing;
        self.expected_ppq = transport.playing.then(|| {
            transport.ppq_position + transport.quarter_notes(num_samples, sample_rate)
        });
    }

    /// Forget the previous block.
    pub fn reset(&mut self) {
        self.expected_ppq = None;
        self.was_playing = false;
    }
}

impl Default for TransportWatcher {
    fn default() -> Self {
        Self::new(0.01)
    }
}
