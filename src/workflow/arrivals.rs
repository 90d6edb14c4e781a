//! Customer arrival generator

use super::{CallCenterModel, CustomerProcess};
use crate::simulation::{Process, ProcessContext, Step, Wake};
use crate::types::{CustomerId, ProcessId, RunParams};
use std::rc::Rc;
use tracing::debug;

/// Spawns customers at randomized intervals
///
/// Each gap is drawn uniformly from `interval-1..=interval+1` and floored at
/// one time unit. Customers are numbered from 1. Generation stops after
/// `num_of_customers` arrivals, or runs until the horizon when that is zero.
#[derive(Debug)]
pub struct ArrivalGenerator {
    model: Rc<CallCenterModel>,
    interval: u64,
    limit: usize,
    spawned: u64,
}

impl ArrivalGenerator {
    /// Create a generator for the arrival process described by `run`
    pub fn new(model: Rc<CallCenterModel>, run: &RunParams) -> Self {
        Self { model, interval: run.customer_interval, limit: run.num_of_customers, spawned: 0 }
    }

    /// Customers spawned so far
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    fn next_gap(&self, cx: &mut ProcessContext<'_>) -> f64 {
        let low = self.interval.saturating_sub(1);
        cx.uniform_int(low, self.interval + 1).max(1) as f64
    }

    fn exhausted(&self) -> bool {
        self.limit != 0 && self.spawned >= self.limit as u64
    }
}

impl Process for ArrivalGenerator {
    fn id(&self) -> ProcessId {
        ProcessId::Arrivals
    }

    fn resume(&mut self, cx: &mut ProcessContext<'_>, wake: Wake) -> Step<()> {
        match wake {
            Wake::Start => Step::timeout(self.next_gap(cx)),
            Wake::Timer => {
                self.spawned += 1;
                let id = CustomerId::new(self.spawned);
                debug!(customer = %id, "Customer arrived");
                cx.counters().increment_arrived();
                cx.spawn(Box::new(CustomerProcess::new(id, Rc::clone(&self.model))));
                if self.exhausted() {
                    return Step::Ready(());
                }
                Step::timeout(self.next_gap(cx))
            }
            Wake::Granted(_) => panic!("arrival generator holds no resources"),
        }
    }
}
