//! chopshop engine - real-time kernel and thread bridge.
//!
//! This crate turns the chopshop effect chain into something a host can drive
//! from two threads:
//!
//! | Thread | Type | Role |
//! |--------|------|------|
//! | audio | [`Processor`] | snapshot pickup, automation, [`Kernel`] block loop, statistics |
//! | control | [`Controller`] | bulk publish, persistence, display text, report polling |
//!
//! The two halves share nothing but an `arc-swap` snapshot slot, a bounded
//! report channel and [`SharedParams`] (atomic mirror of the normalized
//! values). Nothing on the audio path locks, blocks or allocates.
//!
//! # Example
//!
//! ```rust
//! use chopshop_core::TransportSnapshot;
//! use chopshop_engine::{AudioBlock, EngineConfig, ParameterId, ParameterState, create};
//!
//! let (mut controller, mut processor, mut reports) = create(&EngineConfig::default());
//! processor.setup(48000.0);
//!
//! let mut preset = ParameterState::default();
//! preset.set(ParameterId::Comb, 1.0);
//! controller.publish(preset);
//!
//! let input = [0.25f32; 256];
//! let (mut left, mut right) = ([0.0f32; 256], [0.0f32; 256]);
//! let status = processor.process(
//!     AudioBlock::new([&input, &input], [&mut left, &mut right]),
//!     Some(TransportSnapshot::playing(120.0, 0.0)),
//!     &[],
//!     &mut reports,
//! );
//! assert!(status.peak.left.is_finite());
//!
//! controller.poll_reports();
//! assert_eq!(controller.value(ParameterId::Comb.index()), Some(1.0));
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod kernel;
pub mod params;
pub mod processor;
pub mod shared;
pub mod state;
pub mod transfer;
pub mod updater;

pub use config::EngineConfig;
pub use controller::Controller;
pub use error::{ConfigError, StateError};
pub use kernel::{Kernel, Peak};
pub use params::{DESCRIPTORS, PARAM_COUNT, ParameterId, ParameterState, SUBDIV_VALUES};
pub use processor::{AudioBlock, BlockStatus, ParamChange, Processor};
pub use shared::SharedParams;
pub use state::{FORMAT_TAG, decode_state, encode_state};
pub use transfer::{StatePublisher, StateReceiver, rt_state_transfer};
pub use updater::{EventBuffer, ParamEvent, ParamEventSink, ParameterUpdater};

/// Sending end of the statistics report channel; pass it to
/// [`Processor::process`] as the event sink.
pub type ReportSender = crossbeam_channel::Sender<ParamEvent>;

/// Build a connected controller/processor pair.
///
/// The returned [`ReportSender`] feeds the controller's report queue; hand it
/// to the audio thread together with the processor.
pub fn create(config: &EngineConfig) -> (Controller, Processor, ReportSender) {
    tracing::debug!(
        sample_rate = config.sample_rate,
        report_rate_hz = config.report_rate_hz,
        "engine created"
    );
    let (publisher, receiver) = rt_state_transfer();
    let shared = SharedParams::new();
    let (report_tx, report_rx) = crossbeam_channel::bounded(config.report_queue_capacity.max(1));
    let controller = Controller::new(publisher, shared.clone(), report_rx);
    let processor = Processor::new(config, receiver, shared);
    (controller, processor, report_tx)
}
