//! chopshop core - parameter mapping, transport grid and DSP primitives
//!
//! The building blocks of the beat-slicing engine that do not depend on any
//! particular effect: everything here is allocation-free on the audio path and
//! `no_std` compatible.
//!
//! # Parameters
//!
//! - [`normalized_to_plain`], [`plain_to_normalized`], [`normalized_to_steps`],
//!   [`steps_to_normalized`] - the normalized ↔ plain mapping functions
//! - [`ParamDescriptor`] - display name, default, range, labels and native mapping
//!
//! # Transport
//!
//! - [`TransportSnapshot`] - host tempo, meter and position for one block
//! - [`PositionTracker`] - maps the transport onto the cut grid and reports
//!   cell boundaries
//! - [`TransportWatcher`] - derives a discontinuity flag for hosts that never set one
//!
//! # DSP
//!
//! - [`StereoStage`] - the per-sample stereo stage contract
//! - [`DelayLine`] - circular delay with linear fractional reads
//! - [`Rng`] - explicit per-stage random generator
//!
//! # no_std Support
//!
//! Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! chopshop-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod delay;
pub mod grid;
pub mod math;
pub mod param_info;
pub mod param_map;
pub mod rng;
pub mod stage;
pub mod transport;

pub use delay::DelayLine;
pub use grid::{BlockGrid, GridPosition, PositionTracker};
pub use math::{cents_to_ratio, flush_denormal, lerp, ms_to_samples, pan_gains};
pub use param_info::{NativeMap, ParamDescriptor, ParamFlags, ParamRange, ParamUnit};
pub use param_map::{
    normalized_to_plain, normalized_to_steps, plain_to_normalized, steps_to_normalized,
};
pub use rng::Rng;
pub use stage::StereoStage;
pub use transport::{TransportSnapshot, TransportWatcher};
