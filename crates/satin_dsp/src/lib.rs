//! Satin DSP - Noise-Shaped Saturation Signal Path
//!
//! This crate provides the audio processing pipeline for Satin, including:
//! - Exponential-knee soft clipper
//! - Cascaded high-pass/low-pass noise-coloring filter with lock-free,
//!   coalesced coefficient updates
//! - Uniform noise source
//! - Per-block processing that masks clipping distortion with colored noise
//!
//! # Architecture
//!
//! The processing path follows a strict "no allocation in audio callback"
//! rule. Filter coefficients are recomputed on the control thread and
//! committed through an SPSC ring buffer; the audio thread installs them at
//! block boundaries.

mod clip;
mod error;
mod filter;
mod noise;
mod processor;

pub use clip::{evaluate, ClipCurve};
pub use error::DspError;
pub use filter::{CoeffSet, FilterController, FilterShape, NoiseFilter, RecomputeFlag};
pub use noise::NoiseSource;
pub use processor::{BlockParams, BlockProcessor};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_exports() {
        // Verify all public types are accessible
        let _curve = ClipCurve {
            threshold: 0.5,
            knee: 1.0,
            ratio: 2.0,
        };
        let _noise = NoiseSource::with_seed(0);
        let _flag = RecomputeFlag::new();
    }
}
