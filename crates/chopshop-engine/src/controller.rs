//! Control-thread side of the engine.

use std::io::{Read, Write};

use crossbeam_channel::Receiver;

use crate::error::StateError;
use crate::params::{PARAM_COUNT, ParameterId, ParameterState};
use crate::shared::SharedParams;
use crate::state::{decode_state, encode_state};
use crate::transfer::StatePublisher;
use crate::updater::ParamEvent;

/// Control-thread handle: bulk parameter changes, persistence, display text
/// and the receiving end of statistics reports.
#[derive(Debug)]
pub struct Controller {
    publisher: StatePublisher,
    shared: SharedParams,
    reports: Receiver<ParamEvent>,
    reported: ParameterState,
}

impl Controller {
    pub(crate) fn new(publisher: StatePublisher, shared: SharedParams, reports: Receiver<ParamEvent>) -> Self {
        Self {
            publisher,
            shared,
            reports,
            reported: ParameterState::default(),
        }
    }

    /// Hand a complete snapshot to the audio thread. It is picked up at the
    /// start of the next block; a newer publish replaces it.
    pub fn publish(&self, state: ParameterState) {
        self.shared.store(&state);
        self.publisher.publish(state);
    }

    /// Change one parameter by publishing a snapshot of the current values.
    pub fn set_value(&self, index: usize, normalized: f64) {
        let mut state = self.state();
        state.set_value(index, normalized);
        self.publish(state);
    }

    /// Current normalized values, as last applied or published.
    pub fn state(&self) -> ParameterState {
        self.shared.snapshot()
    }

    /// Normalized value of one parameter.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.shared.get(index)
    }

    /// Display text of one parameter's current value, e.g. `"-20%"` or `"WarpCut"`.
    pub fn format_value(&self, index: usize) -> Option<String> {
        let id = ParameterId::from_index(index)?;
        let value = if id.is_read_only() {
            self.reported.get(id)
        } else {
            self.shared.value(id)
        };
        Some(id.descriptor().format_value(value))
    }

    /// Normalized value for typed text, without applying it.
    pub fn parse_value(&self, index: usize, text: &str) -> Option<f64> {
        ParameterId::from_index(index)?.descriptor().parse_value(text)
    }

    /// Write the current values to `writer`.
    pub fn save_state<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), StateError> {
        encode_state(&self.state(), writer)?;
        tracing::debug!(params = PARAM_COUNT, "state saved");
        Ok(())
    }

    /// Read values from `reader` and publish them.
    pub fn load_state<R: Read + ?Sized>(&self, reader: &mut R) -> Result<(), StateError> {
        match decode_state(reader) {
            Ok(state) => {
                tracing::info!("state loaded");
                self.publish(state);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "state load failed");
                Err(e)
            }
        }
    }

    /// Drain statistics reports into the display copy and release snapshots
    /// the audio thread has finished with. Returns the number of reports.
    pub fn poll_reports(&mut self) -> usize {
        self.publisher.collect_retired();
        let mut count = 0;
        while let Ok(event) = self.reports.try_recv() {
            self.reported.set_value(event.index, event.value);
            count += 1;
        }
        count
    }

    /// Last reported value of a statistic (or any parameter reported).
    pub fn report(&self, id: ParameterId) -> f64 {
        self.reported.get(id)
    }

    /// Whether a published snapshot has not been picked up yet.
    pub fn is_pending(&self) -> bool {
        self.publisher.is_pending()
    }
}
