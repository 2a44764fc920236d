//! Saturator Engine
//!
//! Splits the effect into its two execution contexts at prepare time:
//!
//! - [`SaturatorController`] lives on the control thread: parameter edits,
//!   the control-loop tick that services deferred coefficient work, and the
//!   visualization queries (clip curve, filter magnitude response).
//! - [`SaturatorProcessor`] lives on the audio thread: the per-block
//!   processing entry point. Nothing on this half blocks, allocates, or
//!   shares a lock with the control thread.
//!
//! [`Saturator`] is the unprepared state. `prepare` consumes it, so calling
//! the processing path before the sample rate is known is unrepresentable.

use std::sync::Arc;

use tracing::{debug, info, warn};

use satin_dsp::{BlockProcessor, FilterController, NoiseFilter, NoiseSource, RecomputeFlag};

use crate::config::ProcessConfig;
use crate::error::{EngineError, EngineResult};
use crate::params::{ParamId, Params};

/// The effect before a sample rate is known.
pub struct Saturator {
    params: Arc<Params>,
    recompute: RecomputeFlag,
}

impl Saturator {
    /// Create the effect with all parameters at their defaults.
    pub fn new() -> Self {
        let recompute = RecomputeFlag::new();
        Self {
            params: Arc::new(Params::new(recompute.clone())),
            recompute,
        }
    }

    /// Shared handle to the parameter store. Values are settable from any
    /// thread before and after prepare.
    pub fn params(&self) -> Arc<Params> {
        Arc::clone(&self.params)
    }

    /// Fix the processing context and split into the control and real-time
    /// halves. The first coefficient set is computed here, synchronously.
    pub fn prepare(
        self,
        config: ProcessConfig,
    ) -> EngineResult<(SaturatorController, SaturatorProcessor)> {
        config.validate().map_err(EngineError::ConfigError)?;

        let shape = self.params.filter_shape();
        let (filter_controller, filter) =
            NoiseFilter::prepare(config.sample_rate, &shape, self.recompute)?;

        info!(
            sample_rate = config.sample_rate,
            max_block_size = config.max_block_size,
            channels = config.channels,
            "prepared saturator"
        );

        let processor = SaturatorProcessor {
            params: Arc::clone(&self.params),
            block: BlockProcessor::new(filter, NoiseSource::new(), config.max_block_size),
        };
        let controller = SaturatorController {
            params: self.params,
            filter: filter_controller,
        };
        Ok((controller, processor))
    }
}

impl Default for Saturator {
    fn default() -> Self {
        Self::new()
    }
}

/// Control-thread half of the prepared effect.
///
/// All methods belong to the control loop's thread. Parameter edits from
/// other threads go through [`Params::set`] directly and are picked up by
/// the next [`tick`](Self::tick).
pub struct SaturatorController {
    params: Arc<Params>,
    filter: FilterController,
}

impl SaturatorController {
    /// Shared handle to the parameter store.
    pub fn params(&self) -> Arc<Params> {
        Arc::clone(&self.params)
    }

    /// Edit a parameter from the control thread.
    ///
    /// Noise-shaping edits recompute coefficients immediately and
    /// synchronously, superseding any recomputation scheduled from another
    /// thread. Returns the snapped value.
    pub fn set(&mut self, id: ParamId, value: f32) -> f32 {
        let snapped = self.params.set(id, value);
        self.tick();
        snapped
    }

    /// Control-loop tick: run the deferred coefficient recomputation if one
    /// is scheduled. At most one recomputation runs per tick, using the
    /// shaping values current at this moment - intermediate edits between
    /// ticks are coalesced away. Returns whether a recomputation ran.
    pub fn tick(&mut self) -> bool {
        let shape = self.params.filter_shape();
        match self.filter.drain(&shape) {
            Ok(ran) => {
                if ran {
                    debug!(
                        hp_freq = shape.hp_freq,
                        hp_q = shape.hp_q,
                        lp_freq = shape.lp_freq,
                        lp_q = shape.lp_q,
                        "recomputed noise filter coefficients"
                    );
                }
                ran
            }
            Err(err) => {
                warn!(%err, "coefficient recompute failed; keeping previous response");
                false
            }
        }
    }

    /// Sample the clipper transfer curve at `sample` with the current
    /// parameters. Sweep the input domain to draw the display curve; this is
    /// the same function the audio path runs, not a preview approximation.
    pub fn clipper_evaluate(&self, sample: f32) -> f32 {
        self.params.snapshot().clip.evaluate(sample)
    }

    /// Cascade magnitude response from the committed coefficients, for
    /// display. Never touches the running filter's state.
    pub fn magnitude_response(&self, frequencies: &[f32], magnitudes: &mut [f32]) {
        self.filter.magnitude_response(frequencies, magnitudes);
    }
}

/// Real-time half of the prepared effect.
pub struct SaturatorProcessor {
    params: Arc<Params>,
    block: BlockProcessor,
}

impl SaturatorProcessor {
    /// Process one block of planar audio.
    ///
    /// Reads the parameter snapshot with relaxed atomic loads, installs any
    /// newly committed filter coefficients, then runs the saturation path.
    ///
    /// # Real-time Safety
    /// No allocations, no syscalls, no locks shared with the control thread.
    pub fn process_block(&mut self, inputs: &[&[f32]], outputs: &mut [&mut [f32]]) {
        let snapshot = self.params.snapshot();
        self.block.process_block(inputs, outputs, &snapshot);
    }

    /// Clear filter delay lines, e.g. when the transport restarts.
    pub fn reset(&mut self) {
        self.block.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn prepared() -> (SaturatorController, SaturatorProcessor) {
        Saturator::new().prepare(ProcessConfig::default()).unwrap()
    }

    fn run_stereo(
        processor: &mut SaturatorProcessor,
        left: &[f32],
        right: &[f32],
    ) -> (Vec<f32>, Vec<f32>) {
        let mut out_l = vec![0.0f32; left.len()];
        let mut out_r = vec![0.0f32; right.len()];
        processor.process_block(&[left, right], &mut [&mut out_l[..], &mut out_r[..]]);
        (out_l, out_r)
    }

    #[test]
    fn test_prepare_validates_config() {
        let config = ProcessConfig {
            sample_rate: 0.0,
            ..ProcessConfig::default()
        };
        assert!(matches!(
            Saturator::new().prepare(config),
            Err(EngineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_default_parameters_are_identity() {
        // Defaults: threshold=1, ratio=1, dry_wet=1 - the effect passes
        // audio through untouched until someone reaches for a control.
        let (_controller, mut processor) = prepared();

        let input: Vec<f32> = (0..512).map(|n| (n as f32 * 0.07).sin() * 0.9).collect();
        let (out_l, out_r) = run_stereo(&mut processor, &input, &input);
        assert_eq!(out_l, input);
        assert_eq!(out_r, input);
    }

    #[test]
    fn test_full_dry_bypasses_wild_settings() {
        let (mut controller, mut processor) = prepared();
        controller.set(ParamId::ClipThreshold, 0.1);
        controller.set(ParamId::ClipKnee, 0.0);
        controller.set(ParamId::ClipRatio, 40.0);
        controller.set(ParamId::NoiseGate, 0.01);
        controller.set(ParamId::PostGain, 5.0);
        controller.set(ParamId::DryWet, 1.0);

        let input: Vec<f32> = (0..512).map(|n| (n as f32 * 0.03).sin()).collect();
        let (out_l, _) = run_stereo(&mut processor, &input, &input);
        assert_eq!(out_l, input, "dry_wet=1.0 is an exact bypass");
    }

    #[test]
    fn test_silence_with_large_gate_stays_silent() {
        let (mut controller, mut processor) = prepared();
        controller.set(ParamId::DryWet, 0.0);
        controller.set(ParamId::NoiseGate, 1.0);
        controller.set(ParamId::ClipThreshold, 0.1);
        controller.set(ParamId::ClipRatio, 40.0);

        let input = vec![0.0f32; 512];
        let (out_l, out_r) = run_stereo(&mut processor, &input, &input);
        assert!(out_l.iter().all(|&s| s == 0.0));
        assert!(out_r.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_saturation_is_audible_when_wet() {
        let (mut controller, mut processor) = prepared();
        controller.set(ParamId::ClipThreshold, 0.3);
        controller.set(ParamId::ClipRatio, 10.0);
        controller.set(ParamId::DryWet, 0.0);

        let input = vec![0.9f32; 512];
        let (out_l, _) = run_stereo(&mut processor, &input, &input);
        assert!(
            out_l.iter().all(|&s| s < 0.9),
            "Wet path must compress a hot signal"
        );
    }

    #[test]
    fn test_off_thread_edits_coalesce_into_one_recompute() {
        let (mut controller, _processor) = prepared();
        let params = controller.params();

        // A burst of edits from a non-control thread...
        let worker = thread::spawn(move || {
            for step in 0..100 {
                params.set(ParamId::HpFreq, 100.0 + step as f32 * 10.0);
            }
        });
        worker.join().unwrap();

        // ...collapses into exactly one recomputation at the next tick.
        assert!(controller.tick(), "First tick services the burst");
        assert!(!controller.tick(), "Nothing left for the second tick");

        // The committed response reflects the final value only.
        let (expected_controller, _p) = {
            let fresh = Saturator::new();
            fresh.params().set(ParamId::HpFreq, 100.0 + 99.0 * 10.0);
            let mut pair = fresh.prepare(ProcessConfig::default()).unwrap();
            pair.0.tick();
            pair
        };

        let freqs = [50.0, 500.0, 5000.0];
        let mut got = [0.0f32; 3];
        let mut expected = [0.0f32; 3];
        controller.magnitude_response(&freqs, &mut got);
        expected_controller.magnitude_response(&freqs, &mut expected);
        for (g, e) in got.iter().zip(expected.iter()) {
            assert!((g - e).abs() < 1e-6, "Response should match final value");
        }
    }

    #[test]
    fn test_control_thread_edit_recomputes_synchronously() {
        let (mut controller, _processor) = prepared();

        controller.set(ParamId::HpFreq, 1000.0);
        // Already recomputed inside set(); the next tick has nothing to do.
        assert!(!controller.tick());

        let mut mags = [0.0f32];
        controller.magnitude_response(&[100.0], &mut mags);
        assert!(
            mags[0] < 0.2,
            "100Hz should be well below the new 1kHz highpass: {}",
            mags[0]
        );
    }

    #[test]
    fn test_clipper_curve_sampler_matches_parameters() {
        let (mut controller, _processor) = prepared();
        controller.set(ParamId::ClipThreshold, 0.5);
        controller.set(ParamId::ClipKnee, 0.0);
        controller.set(ParamId::ClipRatio, 2.0);

        // Below threshold: identity.
        assert_eq!(controller.clipper_evaluate(0.25), 0.25);
        // Above: the same curve the audio path applies.
        let expected = satin_dsp::evaluate(0.9, 0.5, 0.0, 2.0);
        assert_eq!(controller.clipper_evaluate(0.9), expected);
    }

    #[test]
    fn test_extra_output_channel_is_silenced() {
        let (_controller, mut processor) = prepared();

        let input: Vec<f32> = (0..256).map(|n| (n as f32 * 0.05).sin()).collect();
        let mut out_l = vec![0.0f32; 256];
        let mut out_r = vec![1.0f32; 256];
        processor.process_block(&[&input], &mut [&mut out_l[..], &mut out_r[..]]);

        assert_eq!(out_l, input);
        assert!(out_r.iter().all(|&s| s == 0.0));
    }
}
