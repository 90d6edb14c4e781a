//! Tests for the probabilistic retry loop

use call_center_sim::simulation::RetryPolicy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The first attempt always runs and consumes no randomness
#[test]
fn test_first_call_runs_without_drawing() {
    let policy = RetryPolicy::new(0.5);
    let mut rng = StdRng::seed_from_u64(1);
    let mut reference = StdRng::seed_from_u64(1);

    assert!(policy.should_retry(&mut rng));
    assert_eq!(rng.gen::<u64>(), reference.gen::<u64>());
    assert_eq!(policy.attempt_count(), 1);
}

/// With zero failure probability the body runs exactly once
#[test]
fn test_zero_probability_runs_once() {
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..100 {
        let policy = RetryPolicy::new(0.0);
        let mut runs = 0;
        while policy.should_retry(&mut rng) {
            runs += 1;
        }
        assert_eq!(runs, 1);
    }
}

/// The number of runs follows a geometric law
#[test]
fn test_mean_runs_match_failure_probability() {
    let mut rng = StdRng::seed_from_u64(3);
    let trials = 20_000;
    let mut total = 0u64;
    for _ in 0..trials {
        let policy = RetryPolicy::new(0.5);
        while policy.should_retry(&mut rng) {
            total += 1;
        }
    }
    // expected 1 / (1 - p) = 2
    let mean = total as f64 / trials as f64;
    assert!((mean - 2.0).abs() < 0.1, "mean runs {}", mean);
}

/// Every consultation is counted
#[test]
fn test_attempt_count_tracks_calls() {
    let policy = RetryPolicy::new(0.0);
    let mut rng = StdRng::seed_from_u64(4);
    assert_eq!(policy.attempt_count(), 0);
    assert!(policy.should_retry(&mut rng));
    assert!(!policy.should_retry(&mut rng));
    assert_eq!(policy.attempt_count(), 2);
    assert_eq!(policy.failure_probability(), 0.0);
}
