//! Throttled reporting of audio-thread statistics to the control thread.
//!
//! A [`ParameterUpdater`] samples one value at a fixed wall-clock rate,
//! independent of the host block size, and emits a [`ParamEvent`] only when
//! the sampled value differs from the last one reported. Events go to a
//! [`ParamEventSink`]; a full sink drops the event and the updater tries again
//! at its next interval.

use crossbeam_channel::Sender;

/// A `(parameter index, normalized value)` report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamEvent {
    /// Dense parameter index.
    pub index: usize,
    /// New normalized value.
    pub value: f64,
}

/// Non-blocking destination for report events.
pub trait ParamEventSink {
    /// Push an event. Returns `false` if it could not be queued.
    fn push(&mut self, event: ParamEvent) -> bool;
}

impl ParamEventSink for Sender<ParamEvent> {
    fn push(&mut self, event: ParamEvent) -> bool {
        self.try_send(event).is_ok()
    }
}

/// Fixed-capacity event list, preallocated on the control thread.
///
/// For hosts that collect output events per block: hand the buffer to
/// `process`, then drain it into the host queue.
#[derive(Debug, Clone)]
pub struct EventBuffer {
    events: Vec<ParamEvent>,
}

impl EventBuffer {
    /// Create a buffer that holds up to `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
        }
    }

    /// Events queued so far.
    pub fn events(&self) -> &[ParamEvent] {
        &self.events
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove and yield every queued event.
    pub fn drain(&mut self) -> impl Iterator<Item = ParamEvent> + '_ {
        self.events.drain(..)
    }

    /// Drop every queued event, keeping the allocation.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl ParamEventSink for EventBuffer {
    fn push(&mut self, event: ParamEvent) -> bool {
        if self.events.len() == self.events.capacity() {
            return false;
        }
        self.events.push(event);
        true
    }
}

/// Rate-limited reporter for one parameter.
///
/// # Example
///
/// ```rust
/// use chopshop_engine::{EventBuffer, ParameterUpdater};
///
/// let mut updater = ParameterUpdater::new(34, 30.0, 44100.0);
/// let mut events = EventBuffer::with_capacity(8);
/// for _ in 0..10 {
///     updater.update_with(512, &mut events, || 0.25);
/// }
/// assert_eq!(events.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ParameterUpdater {
    index: usize,
    rate_hz: f64,
    interval: i64,
    countdown: i64,
    last: Option<f64>,
}

impl ParameterUpdater {
    /// Create an updater reporting parameter `index` at `rate_hz`.
    pub fn new(index: usize, rate_hz: f64, sample_rate: f64) -> Self {
        let mut updater = Self {
            index,
            rate_hz,
            interval: 1,
            countdown: 0,
            last: None,
        };
        updater.set_sample_rate(sample_rate);
        updater
    }

    /// Recompute the interval and start over.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        let interval = if self.rate_hz > 0.0 {
            (sample_rate / self.rate_hz).floor()
        } else {
            sample_rate
        };
        self.interval = (interval as i64).max(1);
        self.reset();
    }

    /// Forget the last reported value; the next sample is always reported.
    pub fn reset(&mut self) {
        self.countdown = 0;
        self.last = None;
    }

    /// Parameter index this updater reports.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Samples between two reports.
    pub fn interval(&self) -> i64 {
        self.interval
    }

    /// Last value successfully reported.
    pub fn last_reported(&self) -> Option<f64> {
        self.last
    }

    /// Account for `num_samples` and, when the interval has elapsed, call
    /// `sample` and report its result if it changed. Returns whether an
    /// event was pushed.
    ///
    /// `sample` runs once per interval and may reset the underlying
    /// accumulator.
    pub fn update_with<S, F>(&mut self, num_samples: usize, sink: &mut S, sample: F) -> bool
    where
        S: ParamEventSink + ?Sized,
        F: FnOnce() -> f64,
    {
        self.countdown -= num_samples as i64;
        if self.countdown > 0 {
            return false;
        }
        self.countdown += self.interval;
        if self.countdown <= 0 {
            self.countdown = self.interval;
        }

        let value = sample();
        if self.last == Some(value) {
            return false;
        }
        let pushed = sink.push(ParamEvent {
            index: self.index,
            value,
        });
        if pushed {
            self.last = Some(value);
        }
        pushed
    }
}
