//! Circular delay line with linear fractional reads.
//!
//! # Example
//!
//! ```rust
//! use chopshop_core::DelayLine;
//!
//! // 50 ms at 44.1 kHz
//! let mut delay = DelayLine::from_time(44100.0, 0.05);
//! delay.write(1.0);
//! assert_eq!(delay.read(0.0), 1.0);
//! ```

use alloc::vec;
use alloc::vec::Vec;

/// Heap-backed circular delay line.
///
/// `read(0.0)` returns the most recently written sample; `read(d)` the sample
/// written `d` writes earlier. Reads beyond the capacity are clamped.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Creates a delay line holding `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            write_pos: 0,
        }
    }

    /// Creates a delay line long enough for `max_seconds` at `sample_rate`.
    pub fn from_time(sample_rate: f64, max_seconds: f64) -> Self {
        Self::new(Self::samples_for(sample_rate, max_seconds))
    }

    /// Reallocates for a new maximum length and clears the contents.
    ///
    /// Allocates: call from the control thread only.
    pub fn resize_for(&mut self, sample_rate: f64, max_seconds: f64) {
        let capacity = Self::samples_for(sample_rate, max_seconds);
        #[cfg(feature = "tracing")]
        tracing::debug!("delay_resize: {capacity} samples at {sample_rate} Hz");
        self.buffer = vec![0.0; capacity];
        self.write_pos = 0;
    }

    fn samples_for(sample_rate: f64, max_seconds: f64) -> usize {
        (sample_rate * max_seconds).max(0.0) as usize + 2
    }

    /// Reads `delay_samples` behind the last write, interpolating linearly.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(0.0, (len - 1) as f32);
        let whole = delay as usize;
        let frac = delay - whole as f32;

        let read_pos = (self.write_pos + len - whole - 1) % len;
        let older_pos = (read_pos + len - 1) % len;
        let a = self.buffer[read_pos];
        let b = self.buffer[older_pos];
        a + (b - a) * frac
    }

    /// Writes a sample and advances.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Zeroes the contents.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Capacity in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}
