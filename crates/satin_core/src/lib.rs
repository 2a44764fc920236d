//! Satin Core - Noise-Shaped Saturation Engine
//!
//! This crate wires the Satin DSP path to its two execution contexts:
//! - Parameter store with lock-free atomic values and coalesced change
//!   notification
//! - Processing configuration fixed at prepare time
//! - The prepare-time split into a control half and a real-time half
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Control Thread                          │
//! │  edits ──▶ Params ──mark──▶ RecomputeFlag                   │
//! │  tick  ──▶ drain ──▶ coefficients ──rtrb──▶                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Audio Thread                           │
//! │   input ──▶ pre-gain ──▶ clip ──▶ noise inject ──▶ mix      │
//! │                    (zero allocation in this path)           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod engine;
mod error;
mod params;

pub use config::ProcessConfig;
pub use engine::{Saturator, SaturatorController, SaturatorProcessor};
pub use error::{EngineError, EngineResult};
pub use params::{ParamId, ParamRange, ParamSpec, Params, PARAM_COUNT, PARAM_SPECS};

// Re-export DSP types for convenience
pub use satin_dsp::{
    BlockParams, BlockProcessor, ClipCurve, CoeffSet, DspError, FilterController, FilterShape,
    NoiseFilter, NoiseSource, RecomputeFlag,
};
