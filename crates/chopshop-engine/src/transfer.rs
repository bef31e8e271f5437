//! Single-slot snapshot exchange from the control thread to the audio thread.
//!
//! The publisher stores a complete [`ParameterState`] in an `ArcSwapOption`
//! slot; the audio thread swaps the slot empty at the start of each block.
//! Publishing twice before a pickup overwrites the first snapshot, so the
//! audio thread only ever sees the latest one, whole.
//!
//! Snapshots are never freed on the audio thread: the receiver keeps the one
//! it applied last and hands the previous one back over a bounded channel.
//! The publisher drains that channel (dropping the snapshots) on every
//! publish.
//!
//! ```rust
//! use chopshop_engine::{ParameterId, ParameterState, rt_state_transfer};
//!
//! let (publisher, mut receiver) = rt_state_transfer();
//! let mut state = ParameterState::default();
//! state.set(ParameterId::Duty, 0.25);
//! publisher.publish(state);
//!
//! let picked = receiver.take().unwrap();
//! assert_eq!(picked.get(ParameterId::Duty), 0.25);
//! assert!(receiver.take().is_none());
//! ```

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::params::ParameterState;

/// Retired snapshots the audio thread may hand back between two publishes.
const RETIRE_CAPACITY: usize = 4;

type Slot = Arc<ArcSwapOption<ParameterState>>;

/// Create a connected publisher/receiver pair.
pub fn rt_state_transfer() -> (StatePublisher, StateReceiver) {
    let slot: Slot = Arc::new(ArcSwapOption::empty());
    let (retire_tx, retire_rx) = bounded(RETIRE_CAPACITY);
    (
        StatePublisher {
            slot: Arc::clone(&slot),
            retired: retire_rx,
        },
        StateReceiver {
            slot,
            retired: retire_tx,
            current: None,
        },
    )
}

/// Control-thread side.
#[derive(Debug)]
pub struct StatePublisher {
    slot: Slot,
    retired: Receiver<Arc<ParameterState>>,
}

impl StatePublisher {
    /// Publish a snapshot, replacing any snapshot not yet picked up.
    pub fn publish(&self, state: ParameterState) {
        self.collect_retired();
        let replaced = self.slot.swap(Some(Arc::new(state)));
        tracing::debug!(replaced = replaced.is_some(), "state snapshot published");
    }

    /// Whether a published snapshot is still waiting for the audio thread.
    pub fn is_pending(&self) -> bool {
        self.slot.load().is_some()
    }

    /// Drop snapshots the audio thread has finished with. Returns how many.
    pub fn collect_retired(&self) -> usize {
        self.retired.try_iter().count()
    }
}

/// Audio-thread side.
#[derive(Debug)]
pub struct StateReceiver {
    slot: Slot,
    retired: Sender<Arc<ParameterState>>,
    current: Option<Arc<ParameterState>>,
}

impl StateReceiver {
    /// Take the newest unconsumed snapshot, if any. Never blocks and never
    /// frees memory.
    pub fn take(&mut self) -> Option<&ParameterState> {
        let fresh = self.slot.swap(None)?;
        if let Some(previous) = self.current.replace(fresh) {
            match self.retired.try_send(previous) {
                Ok(()) => {}
                // Full only if the publisher stopped draining; disconnected
                // at shutdown. Either way the snapshot is dropped here.
                Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {}
            }
        }
        self.current.as_deref()
    }

    /// The snapshot applied most recently.
    pub fn current(&self) -> Option<&ParameterState> {
        self.current.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterId;

    fn state_with(duty: f64) -> ParameterState {
        let mut s = ParameterState::default();
        s.set(ParameterId::Duty, duty);
        s.set(ParameterId::FillDuty, duty);
        s
    }

    #[test]
    fn test_nothing_pending() {
        let (publisher, mut receiver) = rt_state_transfer();
        assert!(!publisher.is_pending());
        assert!(receiver.take().is_none());
        assert!(receiver.current().is_none());
    }

    #[test]
    fn test_latest_wins() {
        let (publisher, mut receiver) = rt_state_transfer();
        publisher.publish(state_with(0.1));
        publisher.publish(state_with(0.2));
        assert!(publisher.is_pending());

        let picked = *receiver.take().unwrap();
        assert_eq!(picked, state_with(0.2));
        assert!(receiver.take().is_none());
        assert!(!publisher.is_pending());
    }

    #[test]
    fn test_previous_snapshot_returned_to_publisher() {
        let (publisher, mut receiver) = rt_state_transfer();
        publisher.publish(state_with(0.1));
        receiver.take();
        assert_eq!(publisher.collect_retired(), 0);

        publisher.publish(state_with(0.2));
        receiver.take();
        assert_eq!(publisher.collect_retired(), 1);
        assert_eq!(receiver.current(), Some(&state_with(0.2)));
    }

    #[test]
    fn test_receiver_survives_publisher_drop() {
        let (publisher, mut receiver) = rt_state_transfer();
        publisher.publish(state_with(0.3));
        receiver.take();
        publisher.publish(state_with(0.4));
        drop(publisher);
        assert_eq!(receiver.take(), Some(&state_with(0.4)));
    }
}
