//! Identifier types for the call center simulator
//!
//! Customers are numbered monotonically in arrival order, starting at 1. The
//! background maintenance process and the arrival generator carry reserved
//! identities so every log line can name its actor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// First cycle id used by the maintenance process; each loop iteration takes the next one
pub const MAINTENANCE_ID_BASE: u64 = 1_000_000_000;

/// Unique identifier for a simulated customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(u64);

impl CustomerId {
    /// Wrap a raw arrival number
    #[inline]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the raw arrival number
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a simulated process, used to tag log output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// A customer going through registration and support
    Customer(CustomerId),
    /// The background maintenance loop
    Maintenance,
    /// The generator that spawns customers
    Arrivals,
}

impl ProcessId {
    /// Customer id, if this process is a customer
    pub fn customer(self) -> Option<CustomerId> {
        match self {
            ProcessId::Customer(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Customer(id) => write!(f, "{}", id),
            ProcessId::Maintenance => write!(f, "maintenance"),
            ProcessId::Arrivals => write!(f, "arrivals"),
        }
    }
}
