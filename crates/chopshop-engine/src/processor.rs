//! Audio-thread side of the engine.
//!
//! [`Processor`] wraps the [`Kernel`] with everything a host callback needs:
//! snapshot pickup, automation coalescing, transport jump detection, silence
//! flags and statistics reporting. After [`Processor::setup`] every call is
//! allocation-free and lock-free.

use std::mem;

use chopshop_core::{TransportSnapshot, TransportWatcher};

use crate::config::EngineConfig;
use crate::kernel::{Kernel, Peak};
use crate::params::{PARAM_COUNT, ParameterId, ParameterState};
use crate::shared::SharedParams;
use crate::transfer::StateReceiver;
use crate::updater::{ParamEventSink, ParameterUpdater};

/// Scale applied to per-interval event counts before reporting.
const COUNT_SCALE: f64 = 1000.0;

/// Stereo buffers for one host callback.
#[derive(Debug)]
pub struct AudioBlock<'a> {
    /// Left and right input.
    pub inputs: [&'a [f32]; 2],
    /// Left and right output.
    pub outputs: [&'a mut [f32]; 2],
    /// Host silence hints for the inputs.
    pub input_silent: [bool; 2],
}

impl<'a> AudioBlock<'a> {
    /// A block with no silence hints.
    pub fn new(inputs: [&'a [f32]; 2], outputs: [&'a mut [f32]; 2]) -> Self {
        Self {
            inputs,
            outputs,
            input_silent: [false; 2],
        }
    }

    /// Samples to process: the shortest of the four buffers.
    pub fn len(&self) -> usize {
        let [in_l, in_r] = &self.inputs;
        let [out_l, out_r] = &self.outputs;
        in_l.len().min(in_r.len()).min(out_l.len()).min(out_r.len())
    }

    /// Whether there is nothing to process.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One automation point: a normalized value for a dense index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamChange {
    /// Dense parameter index.
    pub index: usize,
    /// Normalized value.
    pub value: f64,
}

/// What the host gets back from [`Processor::process`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlockStatus {
    /// Output peaks.
    pub peak: Peak,
    /// Silence hints for the outputs.
    pub output_silent: [bool; 2],
}

/// Audio-thread engine.
#[derive(Debug)]
pub struct Processor {
    kernel: Kernel,
    receiver: StateReceiver,
    shared: SharedParams,
    state: ParameterState,
    watcher: TransportWatcher,
    cut_updater: ParameterUpdater,
    block_updater: ParameterUpdater,
}

impl Processor {
    pub(crate) fn new(config: &EngineConfig, receiver: StateReceiver, shared: SharedParams) -> Self {
        let sample_rate = config.sample_rate;
        let mut processor = Self {
            kernel: Kernel::new(sample_rate),
            receiver,
            shared,
            state: ParameterState::default(),
            watcher: TransportWatcher::new(config.jump_tolerance_quarters),
            cut_updater: ParameterUpdater::new(
                ParameterId::CutCount.index(),
                config.report_rate_hz,
                sample_rate,
            ),
            block_updater: ParameterUpdater::new(
                ParameterId::BlockCount.index(),
                config.report_rate_hz,
                sample_rate,
            ),
        };
        for (id, value) in ParameterState::default().iter() {
            processor.kernel.set_normalized(id, value);
        }
        processor
    }

    /// Prepare for a sample rate. Call from the control thread while audio
    /// is stopped; this is the only method that allocates.
    pub fn setup(&mut self, sample_rate: f64) {
        tracing::info!(sample_rate, "processor setup");
        self.kernel.set_sample_rate(sample_rate);
        self.cut_updater.set_sample_rate(sample_rate);
        self.block_updater.set_sample_rate(sample_rate);
        self.watcher.reset();
    }

    /// Clear stage state and statistics, keeping parameters.
    pub fn reset(&mut self) {
        self.kernel.reset();
        self.watcher.reset();
        self.cut_updater.reset();
        self.block_updater.reset();
        *self.state.raw_mut(ParameterId::CutCount) = 0.0;
        *self.state.raw_mut(ParameterId::BlockCount) = 0.0;
    }

    /// The wrapped kernel.
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Normalized values as last applied on this thread.
    pub fn state(&self) -> &ParameterState {
        &self.state
    }

    /// Process one host block.
    ///
    /// Parameters are applied before any audio is produced: first a pending
    /// snapshot, then `changes` (last value per index wins). Statistics are
    /// reported to `sink` at the configured rate.
    pub fn process<S>(
        &mut self,
        block: AudioBlock<'_>,
        transport: Option<TransportSnapshot>,
        changes: &[ParamChange],
        sink: &mut S,
    ) -> BlockStatus
    where
        S: ParamEventSink + ?Sized,
    {
        if let Some(&snapshot) = self.receiver.take() {
            for (id, value) in snapshot.iter() {
                self.apply(id, value);
            }
        }

        let mut pending = [None; PARAM_COUNT];
        for change in changes {
            if let Some(slot) = pending.get_mut(change.index) {
                *slot = Some(change.value);
            }
        }
        for (index, value) in pending.into_iter().enumerate() {
            if let (Some(value), Some(id)) = (value, ParameterId::from_index(index)) {
                self.apply(id, value);
            }
        }

        let num_samples = block.len();
        if num_samples == 0 {
            return BlockStatus::default();
        }

        let mut transport = transport.unwrap_or_default();
        self.watcher
            .observe(&mut transport, num_samples, self.kernel.sample_rate());

        let bypassed = self.kernel.is_bypassed();
        let input_silent = block.input_silent;
        let peak = self.kernel.process(block.inputs, block.outputs, &transport);

        if bypassed {
            return BlockStatus {
                peak,
                output_silent: input_silent,
            };
        }

        self.report_statistics(num_samples, sink);
        BlockStatus {
            peak,
            output_silent: [peak.is_silent(); 2],
        }
    }

    fn apply(&mut self, id: ParameterId, value: f64) {
        if id.is_read_only() {
            return;
        }
        self.state.set(id, value);
        let value = self.state.get(id);
        self.kernel.set_normalized(id, value);
        self.shared.set(id.index(), value);
    }

    fn report_statistics<S>(&mut self, num_samples: usize, sink: &mut S)
    where
        S: ParamEventSink + ?Sized,
    {
        let cuts = f64::from(self.kernel.take_cut_count()) / COUNT_SCALE;
        let blocks = f64::from(self.kernel.take_block_count()) / COUNT_SCALE;
        accumulate(self.state.raw_mut(ParameterId::CutCount), cuts);
        accumulate(self.state.raw_mut(ParameterId::BlockCount), blocks);

        let (state, shared) = (&mut self.state, &self.shared);
        self.cut_updater.update_with(num_samples, sink, || {
            take_statistic(state, shared, ParameterId::CutCount)
        });
        self.block_updater.update_with(num_samples, sink, || {
            take_statistic(state, shared, ParameterId::BlockCount)
        });
    }
}

#[inline]
fn accumulate(slot: &mut f64, amount: f64) {
    *slot = (*slot + amount).min(1.0);
}

fn take_statistic(state: &mut ParameterState, shared: &SharedParams, id: ParameterId) -> f64 {
    let value = mem::take(state.raw_mut(id));
    shared.set(id.index(), value);
    value
}
