//! Control-readable copy of the normalized parameter values.
//!
//! `SharedParams` is cloned into both the [`Processor`](crate::Processor) and
//! the [`Controller`](crate::Controller). The audio thread writes every value
//! it applies; the control thread reads them for display and persistence.
//! Values are stored as atomic `u64` (f64 bit-cast), so individual reads are
//! never torn, but a multi-value read may mix two blocks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::params::{DESCRIPTORS, PARAM_COUNT, ParameterId, ParameterState};

/// Lock-free parameter mirror shared between threads.
#[derive(Debug, Clone)]
pub struct SharedParams {
    values: Arc<[AtomicU64; PARAM_COUNT]>,
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedParams {
    /// Create a mirror holding every parameter's default.
    pub fn new() -> Self {
        let values = core::array::from_fn(|i| AtomicU64::new(DESCRIPTORS[i].default_normalized.to_bits()));
        Self {
            values: Arc::new(values),
        }
    }

    /// Number of parameters.
    pub fn param_count(&self) -> usize {
        PARAM_COUNT
    }

    /// Read a normalized value (lock-free).
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .map(|v| f64::from_bits(v.load(Ordering::Acquire)))
    }

    /// Read a normalized value by identifier.
    pub fn value(&self, id: ParameterId) -> f64 {
        f64::from_bits(self.values[id.index()].load(Ordering::Acquire))
    }

    /// Write a normalized value (lock-free). Out-of-range indices are ignored.
    pub fn set(&self, index: usize, normalized: f64) {
        if let Some(atomic) = self.values.get(index) {
            atomic.store(normalized.to_bits(), Ordering::Release);
        }
    }

    /// Copy every value into a [`ParameterState`].
    pub fn snapshot(&self) -> ParameterState {
        let mut state = ParameterState::default();
        for id in ParameterId::ALL {
            state.set(id, self.value(id));
        }
        state
    }

    /// Overwrite every value from a [`ParameterState`].
    pub fn store(&self, state: &ParameterState) {
        for (index, &value) in state.values().iter().enumerate() {
            self.set(index, value);
        }
    }
}
