//! Uniform Noise Source
//!
//! One independent draw per audio sample, feeding the noise-coloring filter.
//! Statistical whiteness is all that matters here - the generator is not
//! cryptographically significant.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// White-noise generator producing uniform samples in [-1, 1).
pub struct NoiseSource {
    rng: SmallRng,
}

impl NoiseSource {
    /// Create an entropy-seeded source.
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Create a source with a fixed seed, for deterministic tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Draw the next sample, uniform in [-1, 1).
    ///
    /// # Real-time Safety
    /// No allocations, no syscalls, O(1) time.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.rng.gen::<f32>() * 2.0 - 1.0
    }
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::new()
    }
}
