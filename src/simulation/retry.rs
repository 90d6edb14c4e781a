//! Retry policy for operations that may fail transiently
//!
//! A policy is used as the condition of a `while` loop wrapped around one
//! attempt of an operation: the first consultation always answers "run", every
//! later one answers "run again" with the configured failure probability.

use rand::Rng;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct RetryState {
    attempts: u32,
}

/// Decides whether an operation needs another attempt
#[derive(Debug)]
pub struct RetryPolicy {
    failure_probability: f64,
    state: Mutex<RetryState>,
}

impl RetryPolicy {
    /// Create a policy for an operation failing with `failure_probability`
    pub fn new(failure_probability: f64) -> Self {
        Self { failure_probability, state: Mutex::new(RetryState::default()) }
    }

    /// Failure probability this policy was built with
    pub fn failure_probability(&self) -> f64 {
        self.failure_probability
    }

    /// Whether the operation must run (again)
    ///
    /// The first call returns `true` without consuming randomness. Later calls
    /// draw `u` in `[0, 1)` and return `u < failure_probability`.
    pub fn should_retry<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.attempts += 1;
        if state.attempts == 1 {
            return true;
        }
        rng.gen::<f64>() < self.failure_probability
    }

    /// How many times [`RetryPolicy::should_retry`] has been consulted
    pub fn attempt_count(&self) -> u32 {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_first_call_always_runs() {
        let mut rng = StdRng::seed_from_u64(0);
        let policy = RetryPolicy::new(0.0);
        assert!(policy.should_retry(&mut rng));
        assert!(!policy.should_retry(&mut rng));
        assert_eq!(policy.attempt_count(), 2);
    }

    #[test]
    fn test_first_call_consumes_no_randomness() {
        let mut a = StdRng::seed_from_u64(5);
        let mut b = StdRng::seed_from_u64(5);
        let policy = RetryPolicy::new(0.5);
        policy.should_retry(&mut a);
        assert_eq!(a.gen::<u64>(), b.gen::<u64>());
    }

    #[test]
    fn test_zero_probability_runs_exactly_once() {
        let mut rng = StdRng::seed_from_u64(9);
        let policy = RetryPolicy::new(0.0);
        let mut runs = 0;
        while policy.should_retry(&mut rng) {
            runs += 1;
        }
        assert_eq!(runs, 1);
    }

    #[test]
    fn test_retry_count_is_geometric() {
        let mut rng = StdRng::seed_from_u64(21);
        let trials = 2000;
        let mut total_runs = 0u32;
        for _ in 0..trials {
            let policy = RetryPolicy::new(0.5);
            while policy.should_retry(&mut rng) {
                total_runs += 1;
            }
        }
        // expected runs per loop: 1 / (1 - p) = 2
        let mean = total_runs as f64 / trials as f64;
        assert!((mean - 2.0).abs() < 0.15, "mean runs {}", mean);
    }
}
