//! Virtual time management
//!
//! Simulated time is a plain `f64` count of time units since the run started.
//! [`SimTime`] wraps it with a total order so it can key the event heap, and
//! [`SimulationClock`] is the single monotonically advancing clock of a run.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

/// A point in virtual time
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime(f64);

impl SimTime {
    /// Start of every run
    pub const ZERO: SimTime = SimTime(0.0);

    /// Wrap a raw time value
    ///
    /// # Panics
    /// Panics on NaN, which has no place on the time line.
    pub fn new(value: f64) -> Self {
        assert!(!value.is_nan(), "simulated time cannot be NaN");
        SimTime(value)
    }

    /// Raw time value
    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Time value rounded to two decimals, as used by occupancy snapshots
    pub fn rounded(self) -> f64 {
        (self.0 * 100.0).round() / 100.0
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add<f64> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: f64) -> Self::Output {
        SimTime::new(self.0 + rhs)
    }
}

impl Sub for SimTime {
    type Output = f64;

    fn sub(self, rhs: SimTime) -> Self::Output {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The clock of one simulation run
#[derive(Debug, Clone, Default)]
pub struct SimulationClock {
    now: SimTime,
}

impl SimulationClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Move the clock forward to `to`
    ///
    /// # Panics
    /// Panics if `to` lies in the past.
    pub fn advance_to(&mut self, to: SimTime) {
        assert!(
            to >= self.now,
            "clock cannot move backwards: now={}, requested={}",
            self.now,
            to
        );
        self.now = to;
    }
}
