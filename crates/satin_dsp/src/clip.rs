//! Soft Clipping Transfer Function
//!
//! Compresses the excursion of a sample above the clip threshold with an
//! exponential knee, instead of hard-clipping at the threshold. The same
//! function samples the transfer curve for display: sweep `x` over the
//! input domain and plot the result.
//!
//! # Algorithm
//!
//! - At or below threshold: linear (unity gain)
//! - Above threshold: the excursion is normalized into the remaining
//!   headroom, scaled by `exp(-knee * excursion) / ratio`, and rescaled back
//!
//! The curve is asymmetric: negative samples always sit below the threshold
//! and pass unchanged.

/// Clip curve parameters, captured once per block from the parameter store.
///
/// Supported domain: `threshold` in (0, 1), `knee >= 0`, `ratio >= 1`.
/// Nothing is validated here and the result is not clamped - values outside
/// the domain can produce output beyond 1.0, a non-monotonic curve, or
/// NaN (`threshold == 1.0` with input above 1.0). Keeping parameters in
/// range is the parameter store's job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipCurve {
    pub threshold: f32,
    pub knee: f32,
    pub ratio: f32,
}

impl ClipCurve {
    /// Run one sample through the transfer function.
    ///
    /// # Real-time Safety
    /// Pure, stateless, no allocations, O(1) time.
    #[inline]
    pub fn evaluate(&self, sample: f32) -> f32 {
        evaluate(sample, self.threshold, self.knee, self.ratio)
    }
}

/// Soft-clip `sample` against an exponential-knee compression curve.
///
/// See [`ClipCurve`] for the supported parameter domain.
#[inline]
pub fn evaluate(sample: f32, threshold: f32, knee: f32, ratio: f32) -> f32 {
    if sample <= threshold {
        return sample;
    }

    let excursion = (sample - threshold) / (1.0 - threshold);
    (excursion * (-knee * excursion).exp() / ratio) * (1.0 - threshold) + threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVE: ClipCurve = ClipCurve {
        threshold: 0.5,
        knee: 1.0,
        ratio: 4.0,
    };

    #[test]
    fn test_below_threshold_passthrough() {
        for sample in [0.0, 0.1, 0.25, 0.5] {
            assert_eq!(CURVE.evaluate(sample), sample);
        }
    }

    #[test]
    fn test_negative_samples_always_pass() {
        for sample in [-0.1, -0.5, -1.0, -10.0] {
            assert_eq!(CURVE.evaluate(sample), sample);
        }
    }

    #[test]
    fn test_above_threshold_compressed() {
        let out = CURVE.evaluate(0.9);
        assert!(out > CURVE.threshold, "Output should stay above threshold");
        assert!(out < 0.9, "Output should be compressed below input");
    }

    #[test]
    fn test_continuous_at_threshold() {
        // evaluate(threshold + eps) -> threshold as eps -> 0
        let just_above = CURVE.evaluate(CURVE.threshold + 1e-6);
        assert!(
            (just_above - CURVE.threshold).abs() < 1e-5,
            "Curve should be continuous at the knee boundary: {} vs {}",
            just_above,
            CURVE.threshold
        );
    }

    #[test]
    fn test_identity_configuration() {
        // threshold=1, knee=0, ratio=1: identity for all inputs <= 1
        for sample in [-1.0, -0.5, 0.0, 0.3, 0.999, 1.0] {
            assert_eq!(evaluate(sample, 1.0, 0.0, 1.0), sample);
        }
    }

    #[test]
    fn test_zero_knee_is_pure_ratio() {
        // With knee=0 the exponential term vanishes and only the ratio
        // divides the excursion.
        let threshold = 0.5;
        let ratio = 2.0;
        let out = evaluate(0.9, threshold, 0.0, ratio);
        let expected = (0.9 - threshold) / ratio + threshold;
        assert!((out - expected).abs() < 1e-6);
    }

    #[test]
    fn test_result_is_not_clamped() {
        // ratio below the supported minimum expands instead of compressing;
        // the function faithfully reports the out-of-domain result.
        let out = evaluate(0.9, 0.5, 0.0, 0.25);
        assert!(out > 1.0, "No output clamping is performed: {}", out);
    }
}
