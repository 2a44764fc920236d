//! Block Processing
//!
//! Per-block orchestration of the saturation path: one colored-noise buffer
//! is synthesized per block, then every channel runs
//! gain -> clip -> gated noise injection -> dry/wet mix.
//!
//! The noise scratch buffer is allocated once, sized to the maximum block
//! length fixed at prepare time, and reused every block - nothing in the
//! processing path allocates.

use crate::clip::ClipCurve;
use crate::filter::NoiseFilter;
use crate::noise::NoiseSource;

/// Per-block parameter snapshot, read once at block start.
#[derive(Debug, Clone, Copy)]
pub struct BlockParams {
    pub clip: ClipCurve,
    /// Minimum clipping magnitude below which no masking noise is injected.
    pub noise_gate: f32,
    pub pre_gain: f32,
    pub post_gain: f32,
    pub dry_wet: f32,
}

/// The per-block saturation processor.
///
/// Owns the audio-thread half of the noise-coloring filter, the noise
/// source, and the prepare-time scratch buffer.
pub struct BlockProcessor {
    filter: NoiseFilter,
    noise: NoiseSource,
    noise_buf: Vec<f32>,
}

impl BlockProcessor {
    /// Build the processor around a prepared filter.
    ///
    /// `max_block_size` bounds every later block; the scratch buffer is
    /// allocated here and never again.
    pub fn new(filter: NoiseFilter, noise: NoiseSource, max_block_size: usize) -> Self {
        Self {
            filter,
            noise,
            noise_buf: vec![0.0; max_block_size],
        }
    }

    /// Process one block of planar audio.
    ///
    /// Output channels beyond the input channel count are filled with
    /// silence rather than left uninitialized.
    ///
    /// # Real-time Safety
    /// No allocations, no locks, O(channels * samples) time. Blocks longer
    /// than the prepared maximum are a programming error and panic.
    pub fn process_block(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &BlockParams,
    ) {
        let num_samples = outputs.first().map_or(0, |channel| channel.len());
        debug_assert!(
            num_samples <= self.noise_buf.len(),
            "Block exceeds the maximum size fixed at prepare time"
        );

        // Coefficient swaps land at block boundaries only.
        self.filter.apply_pending();

        let noise_buf = &mut self.noise_buf[..num_samples];
        for slot in noise_buf.iter_mut() {
            *slot = self.filter.process_sample(self.noise.next_sample());
        }

        for (channel, output) in outputs.iter_mut().enumerate() {
            let Some(input) = inputs.get(channel) else {
                output.fill(0.0);
                continue;
            };
            debug_assert_eq!(input.len(), output.len(), "Channel buffers must be same length");

            for (i, (x, out)) in input.iter().zip(output.iter_mut()).enumerate() {
                let sample = x * params.pre_gain;
                let mut clipped = params.clip.evaluate(sample);

                let amount_clipped = (clipped - sample).abs();
                if amount_clipped > params.noise_gate {
                    // Inject colored noise proportional to the clipping in
                    // excess of the gate, signed to match the clip direction.
                    clipped += (amount_clipped - params.noise_gate).copysign(clipped) * noise_buf[i];
                }

                *out = sample * params.dry_wet + (1.0 - params.dry_wet) * clipped * params.post_gain;
            }
        }
    }

    /// Clear the filter's delay lines. Call when the transport restarts to
    /// avoid ringing from stale state.
    pub fn reset(&mut self) {
        self.filter.reset();
    }
}
