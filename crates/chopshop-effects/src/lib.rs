//! chopshop effects - the stages of the beat-slicing chain
//!
//! Three concrete stages built on chopshop-core, run in a fixed order:
//!
//! - [`CutStage`] - slices the live input on grid cell boundaries and plays
//!   it back as repeated cuts ([`CutProc`] selects the slicing procedure)
//! - [`BitCrusher`] - bit depth and sample-and-hold rate reduction
//! - [`CombStage`] - feedback or feed-forward comb filter
//!
//! [`EffectChain`] wires them together: every cut started by the cut stage
//! re-randomizes the crusher and comb settings.
//!
//! ## Example
//!
//! ```rust
//! use chopshop_core::{GridPosition, StereoStage, TransportSnapshot};
//! use chopshop_effects::{CutProc, EffectChain};
//!
//! let mut chain = EffectChain::new(48000.0);
//! chain.cut_mut().set_cut_proc(CutProc::WarpCut);
//! chain.comb_mut().set_enabled(true);
//! chain.set_time_info(&TransportSnapshot::playing(128.0, 0.0));
//!
//! chain.set_position(GridPosition::new(0, 0));
//! let (l, r) = chain.process_stereo(0.5, 0.5);
//! assert!(l.is_finite() && r.is_finite());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod chain;
pub mod comb;
pub mod crusher;
pub mod cut;

pub use chain::EffectChain;
pub use comb::{CombStage, CombType, MAX_DELAY_MS};
pub use crusher::BitCrusher;
pub use cut::{
    BlockPlan, BlockSpec, CutProc, CutProc11Settings, CutSettings, CutStage, LivePlayer,
    SqPusherSettings, WarpCutSettings,
};
