//! Noise-Coloring Filter
//!
//! A cascaded high-pass + low-pass pair of second-order IIR sections that
//! shapes the white noise bed before injection. Based on the RBJ
//! (Robert Bristow-Johnson) Audio EQ Cookbook via the `biquad` crate.
//!
//! # Architecture
//!
//! [`NoiseFilter::prepare`] splits the filter into two halves:
//!
//! - [`FilterController`] lives on the control thread. It recomputes both
//!   sections' coefficients from the current shape values and commits them
//!   as one immutable [`CoeffSet`] through an SPSC ring buffer. Recompute
//!   requests from other threads are coalesced through a [`RecomputeFlag`]
//!   and drained at most once per control tick - the transcendental math
//!   never runs on the audio thread.
//! - [`NoiseFilter`] lives on the audio thread. It pops the newest committed
//!   coefficient set at block boundaries and runs the per-sample cascade.
//!   Delay-line state is owned here exclusively and survives coefficient
//!   swaps.
//!
//! There is no way to process a sample before `prepare` has fixed the sample
//! rate and computed the first coefficient set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use biquad::{Biquad, Coefficients, DirectForm2Transposed, Hertz, Type};
use num_complex::Complex;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::error::DspError;

/// Capacity of the coefficient commit queue. Commits are coalesced on the
/// control side, so more than a couple in flight means the audio thread has
/// stalled; a full ring re-marks the update pending instead of dropping it.
const COEFF_QUEUE_CAPACITY: usize = 8;

/// The four shaping values the coefficients are derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterShape {
    pub hp_freq: f32,
    pub hp_q: f32,
    pub lp_freq: f32,
    pub lp_q: f32,
}

/// One committed coefficient set for both sections.
///
/// Immutable once built; replaced as a whole, never mutated in place, so a
/// new frequency can never be observed paired with a stale Q.
#[derive(Debug, Clone, Copy)]
pub struct CoeffSet {
    pub hp: Coefficients<f32>,
    pub lp: Coefficients<f32>,
}

impl CoeffSet {
    /// Derive both sections' coefficients from the shape values.
    pub fn compute(sample_rate: f32, shape: &FilterShape) -> Result<Self, DspError> {
        let fs = Hertz::<f32>::from_hz(sample_rate)
            .map_err(|_| DspError::InvalidSampleRate(sample_rate))?;

        let hp = section_coefficients(Type::HighPass, fs, shape.hp_freq, shape.hp_q, sample_rate)?;
        let lp = section_coefficients(Type::LowPass, fs, shape.lp_freq, shape.lp_q, sample_rate)?;

        Ok(Self { hp, lp })
    }

    /// Cascade magnitude at `frequency`: the product of the two sections'
    /// independently computed magnitudes.
    pub fn magnitude_at(&self, frequency: f32, sample_rate: f32) -> f32 {
        section_magnitude(&self.hp, frequency, sample_rate)
            * section_magnitude(&self.lp, frequency, sample_rate)
    }
}

fn section_coefficients(
    filter: Type<f32>,
    fs: Hertz<f32>,
    frequency: f32,
    q: f32,
    sample_rate: f32,
) -> Result<Coefficients<f32>, DspError> {
    let invalid = || DspError::InvalidCoefficients {
        frequency,
        sample_rate,
    };
    let f0 = Hertz::<f32>::from_hz(frequency).map_err(|_| invalid())?;
    Coefficients::<f32>::from_params(filter, fs, f0, q).map_err(|_| invalid())
}

/// Magnitude of one second-order section at `frequency`, evaluated on the
/// unit circle from its transfer function.
fn section_magnitude(c: &Coefficients<f32>, frequency: f32, sample_rate: f32) -> f32 {
    let omega = 2.0 * std::f32::consts::PI * frequency / sample_rate;
    let z = Complex::from_polar(1.0, -omega);

    let numerator = c.b0 + (c.b1 + c.b2 * z) * z;
    let denominator = 1.0 + (c.a1 + c.a2 * z) * z;
    (numerator / denominator).norm()
}

/// Coalescing "recompute needed" flag.
///
/// Any thread may mark it; the control loop takes it at most once per tick.
/// This replaces per-parameter listener registration: the parameter store
/// marks the flag, the control tick drains it with whatever values are
/// current by then.
#[derive(Debug, Clone)]
pub struct RecomputeFlag(Arc<AtomicBool>);

impl RecomputeFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Request a recomputation. Safe from any thread.
    #[inline]
    pub fn mark(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Consume the request, returning whether one was pending.
    #[inline]
    fn take(&self) -> bool {
        self.0.swap(false, Ordering::Acquire)
    }

    /// Whether a request is currently pending.
    #[inline]
    pub fn is_marked(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for RecomputeFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Control-thread half: owns coefficient derivation and commit.
pub struct FilterController {
    sample_rate: f32,
    committed: CoeffSet,
    pending: RecomputeFlag,
    tx: Producer<CoeffSet>,
}

impl FilterController {
    /// Current sample rate, fixed at prepare time.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// The most recently committed coefficient set.
    pub fn committed(&self) -> &CoeffSet {
        &self.committed
    }

    /// Whether a deferred recomputation is waiting for the next tick.
    pub fn is_pending(&self) -> bool {
        self.pending.is_marked()
    }

    /// Synchronous recompute + commit with the given shape values.
    ///
    /// Clears the pending flag first, so a recomputation scheduled from
    /// another thread is superseded rather than run later with stale intent.
    pub fn recompute(&mut self, shape: &FilterShape) -> Result<(), DspError> {
        self.pending.take();
        let coeffs = CoeffSet::compute(self.sample_rate, shape)?;
        self.commit(coeffs);
        Ok(())
    }

    /// Run at most one coalesced recomputation if any thread requested one
    /// since the last tick. Returns `Ok(true)` when a recompute ran.
    ///
    /// N requests between ticks collapse into a single recomputation using
    /// the shape values current at drain time - intermediate states are
    /// dropped, never processed.
    pub fn drain(&mut self, shape: &FilterShape) -> Result<bool, DspError> {
        if !self.pending.take() {
            return Ok(false);
        }
        let coeffs = CoeffSet::compute(self.sample_rate, shape)?;
        self.commit(coeffs);
        Ok(true)
    }

    fn commit(&mut self, coeffs: CoeffSet) {
        self.committed = coeffs;
        if self.tx.push(coeffs).is_err() {
            // Ring full: the audio thread has not drained since the last
            // commits. Leave the update pending and retry on a later tick.
            self.pending.mark();
        }
    }

    /// Cascade magnitude response from the committed coefficients.
    ///
    /// Display-path only; never touches delay-line state.
    pub fn magnitude_response(&self, frequencies: &[f32], magnitudes: &mut [f32]) {
        debug_assert_eq!(frequencies.len(), magnitudes.len());
        for (frequency, magnitude) in frequencies.iter().zip(magnitudes.iter_mut()) {
            *magnitude = self.committed.magnitude_at(*frequency, self.sample_rate);
        }
    }
}

/// Audio-thread half: the running cascade.
pub struct NoiseFilter {
    rx: Consumer<CoeffSet>,
    hp: DirectForm2Transposed<f32>,
    lp: DirectForm2Transposed<f32>,
}

impl NoiseFilter {
    /// Fix the sample rate and compute the first coefficient set
    /// synchronously, so the filter is usable from the very next sample.
    ///
    /// `pending` is the flag writers mark to request a deferred
    /// recomputation (shared with the parameter store).
    pub fn prepare(
        sample_rate: f32,
        shape: &FilterShape,
        pending: RecomputeFlag,
    ) -> Result<(FilterController, NoiseFilter), DspError> {
        let coeffs = CoeffSet::compute(sample_rate, shape)?;
        let (tx, rx) = RingBuffer::new(COEFF_QUEUE_CAPACITY);

        let controller = FilterController {
            sample_rate,
            committed: coeffs,
            pending,
            tx,
        };
        let filter = NoiseFilter {
            rx,
            hp: DirectForm2Transposed::<f32>::new(coeffs.hp),
            lp: DirectForm2Transposed::<f32>::new(coeffs.lp),
        };
        Ok((controller, filter))
    }

    /// Install the newest committed coefficient set, if any. Call once per
    /// block. Delay-line state is preserved across the swap.
    ///
    /// # Real-time Safety
    /// Lock-free pops from the SPSC ring; no allocations.
    #[inline]
    pub fn apply_pending(&mut self) {
        let mut latest = None;
        while let Ok(coeffs) = self.rx.pop() {
            latest = Some(coeffs);
        }
        if let Some(coeffs) = latest {
            self.hp.update_coefficients(coeffs.hp);
            self.lp.update_coefficients(coeffs.lp);
        }
    }

    /// Run one sample through the cascade: high-pass first, then low-pass.
    ///
    /// # Real-time Safety
    /// No allocations, no syscalls, O(1) time.
    #[inline]
    pub fn process_sample(&mut self, sample: f32) -> f32 {
        self.lp.run(self.hp.run(sample))
    }

    /// Clear both sections' delay lines.
    pub fn reset(&mut self) {
        self.hp.reset_state();
        self.lp.reset_state();
    }
}
