//! Statistics collection and reporting
//!
//! [`RunCounters`] is updated by the workflow processes while a run is in
//! progress. [`RunStatistics`] is the consolidated view produced once the run
//! reaches its horizon, serialized to `run_summary.json` and printed by the CLI.

use crate::simulation::{ActivityReport, PoolStats};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// File name of the serialized run summary
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

/// Business-outcome counters updated during a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    /// Customers spawned by the arrival generator
    pub customers_arrived: u64,
    /// Customers turned away by registration or identification
    pub customers_rejected: u64,
    /// Customers who completed a support call
    pub customers_handled: u64,
    /// Support calls ended by a successful solved check
    pub resolved: u64,
    /// Support calls ended with a hardware lab referral
    pub hardware_referrals: u64,
    /// Support calls escalated to a reception desk
    pub escalations: u64,
    /// Incidents closed after a call
    pub incidents_updated: u64,
    /// Completed maintenance cycles
    pub maintenance_cycles: u64,
}

impl RunCounters {
    /// Record a new arrival
    pub fn increment_arrived(&mut self) {
        self.customers_arrived += 1;
    }

    /// Record a rejected customer
    pub fn increment_rejected(&mut self) {
        self.customers_rejected += 1;
    }

    /// Record a completed call
    pub fn increment_handled(&mut self) {
        self.customers_handled += 1;
    }

    /// Record a resolved call
    pub fn increment_resolved(&mut self) {
        self.resolved += 1;
    }

    /// Record a hardware referral
    pub fn increment_hardware_referrals(&mut self) {
        self.hardware_referrals += 1;
    }

    /// Record an escalation
    pub fn increment_escalations(&mut self) {
        self.escalations += 1;
    }

    /// Record a closed incident
    pub fn increment_incidents_updated(&mut self) {
        self.incidents_updated += 1;
    }

    /// Record a completed maintenance cycle
    pub fn increment_maintenance_cycles(&mut self) {
        self.maintenance_cycles += 1;
    }
}

/// Consolidated statistics of one finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunStatistics {
    /// Scenario name
    pub scenario: String,
    /// Seed actually used for the random stream
    pub seed: u64,
    /// Configured horizon
    pub horizon: f64,
    /// Clock value when the run stopped
    pub final_clock: f64,
    /// Events fired before the horizon
    pub events_processed: u64,
    /// Events still pending at the horizon
    pub events_discarded: usize,
    /// Processes left suspended at the horizon
    pub processes_abandoned: usize,
    /// Business-outcome counters
    #[serde(flatten)]
    pub counters: RunCounters,
    /// Per-pool usage
    pub pools: Vec<PoolStats>,
    /// Activity occupancy and runtime report
    pub activities: ActivityReport,
    /// Wall-clock time spent running the model
    pub wall_clock: Duration,
}

impl RunStatistics {
    fn percentage(part: u64, whole: u64) -> f64 {
        if whole == 0 {
            0.0
        } else {
            (part as f64 / whole as f64) * 100.0
        }
    }

    /// Percentage of arrivals that were rejected
    pub fn rejection_percentage(&self) -> f64 {
        Self::percentage(self.counters.customers_rejected, self.counters.customers_arrived)
    }

    /// Percentage of handled calls that were resolved
    pub fn resolution_percentage(&self) -> f64 {
        Self::percentage(self.counters.resolved, self.counters.customers_handled)
    }

    /// Percentage of handled calls that were escalated
    pub fn escalation_percentage(&self) -> f64 {
        Self::percentage(self.counters.escalations, self.counters.customers_handled)
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Generate a compact one-line summary suitable for logging
    pub fn compact_summary(&self) -> String {
        let c = &self.counters;
        format!(
            "t={:.2} | arrived {} | rejected {} | handled {} | resolved {} | hw {} \
             | escalated {} | events {}",
            self.final_clock,
            c.customers_arrived,
            c.customers_rejected,
            c.customers_handled,
            c.resolved,
            c.hardware_referrals,
            c.escalations,
            self.events_processed
        )
    }

    /// Generate a comprehensive summary report
    pub fn generate_summary_report(&self) -> String {
        let c = &self.counters;
        let mut report = String::new();

        report.push_str(&format!("=== Run Summary: {} ===\n\n", self.scenario));
        report.push_str(&format!("Random Seed: {}\n", self.seed));
        report.push_str(&format!(
            "Simulated Time: {:.2} of {:.2} (wall clock {:.2}s)\n",
            self.final_clock,
            self.horizon,
            self.wall_clock.as_secs_f64()
        ));
        report.push_str(&format!(
            "Events: {} processed, {} discarded at horizon, {} processes abandoned\n\n",
            self.events_processed, self.events_discarded, self.processes_abandoned
        ));

        report.push_str("Customers:\n");
        report.push_str(&format!("  - Arrived: {}\n", c.customers_arrived));
        report.push_str(&format!(
            "  - Rejected: {} ({:.1}%)\n",
            c.customers_rejected,
            self.rejection_percentage()
        ));
        report.push_str(&format!("  - Handled: {}\n", c.customers_handled));
        report.push_str(&format!("  - Incidents updated: {}\n\n", c.incidents_updated));

        report.push_str("Support outcomes:\n");
        report.push_str(&format!(
            "  - Resolved: {} ({:.1}%)\n",
            c.resolved,
            self.resolution_percentage()
        ));
        report.push_str(&format!("  - Hardware referrals: {}\n", c.hardware_referrals));
        report.push_str(&format!(
            "  - Escalations: {} ({:.1}%)\n\n",
            c.escalations,
            self.escalation_percentage()
        ));

        report.push_str(&format!("Maintenance cycles: {}\n\n", c.maintenance_cycles));

        report.push_str("Resource pools:\n");
        for pool in &self.pools {
            report.push_str(&format!(
                "  - {}: peak {}/{} held, {} grants\n",
                pool.name, pool.peak_held, pool.capacity, pool.grants
            ));
        }
        report.push('\n');
        report.push_str(&self.activities.summary());

        report
    }
}
