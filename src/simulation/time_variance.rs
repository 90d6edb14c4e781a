//! Randomized durations for simulated work
//!
//! Every timed step of the model takes a duration drawn from a normal
//! distribution around its nominal centre, with a standard deviation of ten
//! percent of the centre (rounded up) and a floor of one time unit.

use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Standard deviation as a fraction of the centre
const DEFAULT_DEVIATION_RATIO: f64 = 0.1;

/// Shortest duration any step may take
const MIN_DURATION: f64 = 1.0;

/// Sampler for randomized step durations
///
/// Holds no random state of its own; callers pass the run's single random
/// stream so that runs stay reproducible under a fixed seed.
#[derive(Debug, Clone, Copy)]
pub struct TimeVariance {
    deviation_ratio: f64,
    minimum: f64,
}

impl TimeVariance {
    /// Create a sampler with the default deviation ratio and floor
    pub fn new() -> Self {
        Self { deviation_ratio: DEFAULT_DEVIATION_RATIO, minimum: MIN_DURATION }
    }

    /// Draw a duration around `center`
    ///
    /// Falls back to `max(center, 1)` when the distribution cannot be built
    /// (non-finite centre).
    pub fn sample<R: Rng + ?Sized>(&self, center: f64, rng: &mut R) -> f64 {
        let std_dev = (center * self.deviation_ratio).ceil();
        match Normal::new(center, std_dev) {
            Ok(normal) => normal.sample(rng).max(self.minimum),
            Err(_) => center.max(self.minimum),
        }
    }
}

impl Default for TimeVariance {
    fn default() -> Self {
        Self::new()
    }
}
