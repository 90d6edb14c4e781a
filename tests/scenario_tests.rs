//! End-to-end scenario runs through the orchestrator
//!
//! Each test drives a full run (arrivals, registration, support, incident
//! closing and maintenance) and checks the outcome through the run statistics
//! and the activity tracker.

use call_center_sim::simulation::{RunStatistics, SimulationOrchestrator};
use call_center_sim::types::{Activity, PathVariant, Scenario, SimulationConfig};

/// A bounded population with a horizon long enough for everyone to finish
fn bounded_config(name: &str, seed: u64) -> SimulationConfig {
    let mut config = SimulationConfig::for_scenario(Scenario {
        name: name.to_string(),
        random_seed: Some(seed),
        ..Default::default()
    });
    config.run.num_of_customers = 40;
    config.run.customer_interval = 5;
    config.run.sim_time = 5000.0;
    config
}

fn run(config: SimulationConfig) -> (SimulationOrchestrator, RunStatistics) {
    let mut orchestrator = SimulationOrchestrator::new(config).unwrap();
    let stats = orchestrator.run().unwrap();
    (orchestrator, stats)
}

fn runs(orchestrator: &SimulationOrchestrator, activity: Activity) -> usize {
    orchestrator.tracker().durations(activity).len()
}

/// When every solved check succeeds, each call has exactly one and resolves
#[test]
fn test_certain_resolution_one_check_per_call() {
    let mut config = bounded_config("always-solved", 11);
    config.params.problem_solved_probability = 1.0;
    config.params.hw_issue_probability = 0.0;
    let (orchestrator, stats) = run(config);

    let counters = stats.counters;
    assert_eq!(counters.customers_arrived, 40);
    assert_eq!(counters.customers_handled + counters.customers_rejected, 40);
    assert!(counters.customers_handled > 0);
    assert_eq!(counters.escalations, 0);
    assert_eq!(counters.hardware_referrals, 0);
    assert_eq!(counters.resolved, counters.customers_handled);
    assert_eq!(counters.incidents_updated, counters.customers_handled);

    let calls = runs(&orchestrator, Activity::Support);
    assert_eq!(calls as u64, counters.customers_handled);
    assert_eq!(runs(&orchestrator, Activity::IsProblemSolved), calls);
}

/// Nobody gets through registration when identification and registration both fail
#[test]
fn test_everyone_rejected_when_registration_always_fails() {
    let mut config = bounded_config("closed-doors", 12);
    config.params.failed_identification_rate = 1.0;
    config.params.registration_failure_rate = 1.0;
    let (orchestrator, stats) = run(config);

    assert_eq!(stats.counters.customers_arrived, 40);
    assert_eq!(stats.counters.customers_rejected, 40);
    assert_eq!(stats.counters.customers_handled, 0);
    assert_eq!(runs(&orchestrator, Activity::Support), 0);
    assert_eq!(runs(&orchestrator, Activity::RegisterNewCustomer), 40);

    let bots = stats.pools.iter().find(|pool| pool.name == "bots").unwrap();
    assert_eq!(bots.grants, 0);
    assert_eq!(bots.peak_held, 0);
}

/// A certain reboot followed by a certain solved check skips the diagnostic branch
#[test]
fn test_reboot_path_short_circuits_diagnostics() {
    let mut config = bounded_config("reboot-first", 13);
    config.scenario.path_variants = [PathVariant::InsertReboot].into_iter().collect();
    config.params.needs_reboot_probability = 1.0;
    config.params.problem_solved_probability = 1.0;
    let (orchestrator, stats) = run(config);

    assert!(stats.counters.customers_handled > 0);
    assert_eq!(stats.counters.escalations, 0);
    assert!(runs(&orchestrator, Activity::RebootDevice) > 0);
    for activity in [
        Activity::InitiateDiagnostic,
        Activity::IsUpgradeNeeded,
        Activity::UpdateSoftware,
        Activity::IsHwIssue,
        Activity::QueryRemoteArchives,
    ] {
        assert_eq!(runs(&orchestrator, activity), 0, "{} should not run", activity);
    }
}

/// Scarce pools never hand out more units than they own
#[test]
fn test_pools_respect_capacity() {
    let mut config = bounded_config("scarce", 14);
    config.params.num_of_bots = 2;
    config.params.num_of_updaters = 1;
    config.params.num_of_remote_legacy_archives_connections = 1;
    config.params.num_of_db_connections = 2;
    config.scenario.high_level_failure_probability = 0.3;
    config.scenario.low_level_failure_probability = 0.3;
    let (_orchestrator, stats) = run(config);

    for pool in &stats.pools {
        assert!(
            pool.peak_held <= pool.capacity,
            "{} held {} of {}",
            pool.name,
            pool.peak_held,
            pool.capacity
        );
    }
    assert!(stats.activities.peak(Activity::Support).unwrap_or(0) <= 2);
    assert!(stats.activities.peak(Activity::UpdateIncident).unwrap_or(0) <= 1);
}

/// A run that is not cut short leaves every activity empty
#[test]
fn test_occupancy_drains_without_truncation() {
    let mut config = bounded_config("drain", 15);
    config.run.num_of_customers = 10;
    config.scenario.low_level_failure_probability = 0.2;
    let (orchestrator, stats) = run(config);

    assert_eq!(stats.counters.customers_arrived, 10);
    assert_eq!(stats.counters.incidents_updated, stats.counters.customers_handled);
    for activity in Activity::ALL {
        assert_eq!(orchestrator.tracker().occupancy(activity), 0, "{} not drained", activity);
    }
    assert!(stats.counters.maintenance_cycles > 0);
}

/// A short horizon cuts live work and still ends the clock at the horizon
#[test]
fn test_short_horizon_truncates_work() {
    let mut config = bounded_config("cut-short", 16);
    config.run.num_of_customers = 0;
    config.run.sim_time = 100.0;
    let (orchestrator, stats) = run(config);

    assert_eq!(stats.final_clock, 100.0);
    assert_eq!(orchestrator.now().as_f64(), 100.0);
    assert!(stats.processes_abandoned >= 1);
    assert!(stats.events_discarded >= 1);
    assert!(orchestrator.tracker().is_ended());
}
