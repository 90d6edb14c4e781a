//! Support flow run while a customer holds a bot
//!
//! The nominal sequence is: configuration check, repair when misconfigured,
//! diagnostic, update check and update, hardware check, remote archive lookup
//! and a final solved check. Any solved check that succeeds ends the call. The
//! scenario may reorder the repair steps or insert a reboot before the
//! diagnostic.

use super::{CallCenterModel, Flow};
use crate::simulation::{Guard, ProcessContext, RetryPolicy, SimTime, Step, Wake};
use crate::types::{Activity, CustomerId, PathVariant, SupportOutcome};
use std::rc::Rc;
use tracing::{error, info};

const NOMINAL_REPAIR: [Activity; 3] =
    [Activity::ResetCachedMemory, Activity::IsProblemSolved, Activity::ConfigureDevice];

const REORDERED_REPAIR: [Activity; 3] =
    [Activity::ConfigureDevice, Activity::ResetCachedMemory, Activity::IsProblemSolved];

/// Position in the support sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    ConfigCheck,
    Repair(usize),
    Reboot,
    RebootSolvedCheck,
    Diagnostic,
    UpgradeCheck,
    Update,
    UpdateSolvedCheck,
    HardwareCheck,
    Archives,
    FinalSolvedCheck,
}

/// Support call for one customer; yields how the call ended
#[derive(Debug)]
pub struct SupportFlow {
    customer: CustomerId,
    model: Rc<CallCenterModel>,
    repair_order: [Activity; 3],
    started: SimTime,
    stage: Stage,
    stage_started: SimTime,
    diagnostic: Option<RetryPolicy>,
    archive_link: Option<Guard>,
}

impl SupportFlow {
    /// Create the support flow for `customer`
    pub fn new(customer: CustomerId, model: Rc<CallCenterModel>) -> Self {
        let repair_order = if model.scenario.path_variants.contains(PathVariant::ReorderRepair) {
            REORDERED_REPAIR
        } else {
            NOMINAL_REPAIR
        };
        Self {
            customer,
            model,
            repair_order,
            started: SimTime::ZERO,
            stage: Stage::ConfigCheck,
            stage_started: SimTime::ZERO,
            diagnostic: None,
            archive_link: None,
        }
    }

    /// Customer being helped
    pub fn customer(&self) -> CustomerId {
        self.customer
    }

    fn activity(&self, stage: Stage) -> Activity {
        match stage {
            Stage::ConfigCheck => Activity::IsConfigCorrect,
            Stage::Repair(index) => self.repair_order[index],
            Stage::Reboot => Activity::RebootDevice,
            Stage::Diagnostic => Activity::InitiateDiagnostic,
            Stage::UpgradeCheck => Activity::IsUpgradeNeeded,
            Stage::Update => Activity::UpdateSoftware,
            Stage::HardwareCheck => Activity::IsHwIssue,
            Stage::Archives => Activity::QueryRemoteArchives,
            Stage::RebootSolvedCheck | Stage::UpdateSolvedCheck | Stage::FinalSolvedCheck => {
                Activity::IsProblemSolved
            }
        }
    }

    fn nominal_time(&self, activity: Activity) -> f64 {
        let p = &self.model.params;
        match activity {
            Activity::IsConfigCorrect => p.avg_check_config_time,
            Activity::ResetCachedMemory => p.avg_reset_cache_time,
            Activity::ConfigureDevice => p.avg_conf_time,
            Activity::IsProblemSolved => p.avg_check_problem_solved_time,
            Activity::RebootDevice => p.avg_reboot_time,
            Activity::InitiateDiagnostic => p.avg_diagnostic_time,
            Activity::IsUpgradeNeeded => p.avg_check_update_needed_time,
            Activity::UpdateSoftware => p.avg_update_time,
            Activity::IsHwIssue => p.avg_hw_diagnostic_time,
            Activity::QueryRemoteArchives => p.remote_legacy_archives_response_time,
            Activity::Support
            | Activity::UpdateIncident
            | Activity::IsRegistered
            | Activity::RegisterNewCustomer => {
                unreachable!("{} is not a support step", activity)
            }
        }
    }

    /// Enter `stage` and suspend on its first wait
    fn begin(&mut self, cx: &mut ProcessContext<'_>, stage: Stage) -> Step<SupportOutcome> {
        self.stage = stage;
        if stage == Stage::Archives {
            // The activity starts once a link is granted.
            return Step::acquire(self.model.facilities.archive_links);
        }

        let activity = self.activity(stage);
        self.stage_started = cx.now();
        cx.enter(activity);

        if stage == Stage::Diagnostic {
            let retry = RetryPolicy::new(self.model.scenario.low_level_failure_probability);
            retry.should_retry(cx.rng());
            self.diagnostic = Some(retry);
        }

        let mut duration = cx.sample(self.nominal_time(activity));
        if stage == Stage::Reboot {
            duration *= self.model.scenario.path_delay_factor;
        }
        Step::timeout(duration)
    }

    /// Finish the running stage; returns its boolean outcome
    fn complete(&mut self, cx: &mut ProcessContext<'_>) -> bool {
        let p = &self.model.params;
        let outcome = match self.stage {
            Stage::ConfigCheck => {
                let misconfigured = cx.chance(p.required_device_reconfiguration);
                if misconfigured {
                    info!("Device is not configured correctly");
                } else {
                    info!("Device is configured correctly");
                }
                misconfigured
            }
            Stage::UpgradeCheck => {
                let needed = cx.chance(p.required_device_update);
                if needed {
                    info!("Device need software update");
                } else {
                    info!("Device is up to date");
                }
                needed
            }
            Stage::HardwareCheck => {
                let faulty = cx.chance(p.hw_issue_probability);
                if faulty {
                    info!("Device has HW issue please take it to the lab");
                }
                faulty
            }
            Stage::Reboot => {
                info!("Rebooting customer device");
                false
            }
            Stage::Diagnostic => false,
            Stage::Update => {
                info!("Software updated on customer device");
                false
            }
            Stage::Archives => {
                info!("Remote legacy archives queried.");
                self.archive_link = None;
                false
            }
            Stage::RebootSolvedCheck | Stage::UpdateSolvedCheck | Stage::FinalSolvedCheck => {
                self.solved_check(cx)
            }
            Stage::Repair(index) => match self.repair_order[index] {
                Activity::IsProblemSolved => self.solved_check(cx),
                Activity::ResetCachedMemory => {
                    info!("Reset cached memory on customer device");
                    false
                }
                _ => {
                    info!("Apply configuration to customer device");
                    false
                }
            },
        };
        cx.exit(self.activity(self.stage), self.stage_started);
        outcome
    }

    fn solved_check(&self, cx: &mut ProcessContext<'_>) -> bool {
        let solved = cx.chance(self.model.params.problem_solved_probability);
        if solved {
            info!("Problem solved ending communication with customer");
        }
        solved
    }

    fn finish(
        &mut self,
        cx: &mut ProcessContext<'_>,
        outcome: SupportOutcome,
    ) -> Step<SupportOutcome> {
        cx.exit(Activity::Support, self.started);
        Step::Ready(outcome)
    }

    fn reboot_or_diagnose(&mut self, cx: &mut ProcessContext<'_>) -> Step<SupportOutcome> {
        let scenario = &self.model.scenario;
        if scenario.path_variants.contains(PathVariant::InsertReboot)
            && cx.draw() <= self.model.params.needs_reboot_probability
        {
            self.begin(cx, Stage::Reboot)
        } else {
            self.begin(cx, Stage::Diagnostic)
        }
    }

    /// Choose what follows a completed stage
    fn advance(&mut self, cx: &mut ProcessContext<'_>, outcome: bool) -> Step<SupportOutcome> {
        match self.stage {
            Stage::ConfigCheck if outcome => self.begin(cx, Stage::Repair(0)),
            Stage::ConfigCheck => self.reboot_or_diagnose(cx),
            Stage::Repair(index) => {
                if self.repair_order[index] == Activity::IsProblemSolved && outcome {
                    self.finish(cx, SupportOutcome::Resolved)
                } else if index + 1 < self.repair_order.len() {
                    self.begin(cx, Stage::Repair(index + 1))
                } else {
                    self.reboot_or_diagnose(cx)
                }
            }
            Stage::Reboot => self.begin(cx, Stage::RebootSolvedCheck),
            Stage::RebootSolvedCheck | Stage::UpdateSolvedCheck | Stage::FinalSolvedCheck
                if outcome =>
            {
                self.finish(cx, SupportOutcome::Resolved)
            }
            Stage::RebootSolvedCheck => self.begin(cx, Stage::Diagnostic),
            Stage::Diagnostic => self.begin(cx, Stage::UpgradeCheck),
            Stage::UpgradeCheck if outcome => self.begin(cx, Stage::Update),
            Stage::UpgradeCheck => self.begin(cx, Stage::HardwareCheck),
            Stage::Update => self.begin(cx, Stage::UpdateSolvedCheck),
            Stage::UpdateSolvedCheck => self.begin(cx, Stage::HardwareCheck),
            Stage::HardwareCheck if outcome => self.finish(cx, SupportOutcome::HardwareReferral),
            Stage::HardwareCheck => self.begin(cx, Stage::Archives),
            Stage::Archives => self.begin(cx, Stage::FinalSolvedCheck),
            Stage::FinalSolvedCheck => {
                error!("Could not solve device issue. please visit one of our reception desks");
                self.finish(cx, SupportOutcome::Escalated)
            }
        }
    }
}

impl Flow for SupportFlow {
    type Output = SupportOutcome;

    fn resume(&mut self, cx: &mut ProcessContext<'_>, wake: Wake) -> Step<SupportOutcome> {
        match wake {
            Wake::Start => {
                self.started = cx.now();
                cx.enter(Activity::Support);
                self.begin(cx, Stage::ConfigCheck)
            }
            Wake::Granted(link) => {
                assert_eq!(self.stage, Stage::Archives, "archive link granted outside lookup");
                self.archive_link = Some(link);
                self.stage_started = cx.now();
                cx.enter(Activity::QueryRemoteArchives);
                let response = cx.sample(self.model.params.remote_legacy_archives_response_time);
                Step::timeout(response * self.model.scenario.under_performance_factor)
            }
            Wake::Timer => {
                if self.stage == Stage::Diagnostic {
                    info!("Initiated diagnostic on customer device");
                    let again = match &self.diagnostic {
                        Some(retry) => retry.should_retry(cx.rng()),
                        None => false,
                    };
                    if again {
                        return Step::timeout(cx.sample(self.model.params.avg_diagnostic_time));
                    }
                }
                let outcome = self.complete(cx);
                self.advance(cx, outcome)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{Engine, Process};
    use crate::types::{PathVariants, ProcessId, SimulationConfig};
    use crate::workflow::test_support::*;
    use std::cell::Cell;

    /// Runs one support flow without holding a bot
    #[derive(Debug)]
    struct Caller {
        flow: SupportFlow,
        outcome: Rc<Cell<Option<SupportOutcome>>>,
    }

    impl Process for Caller {
        fn id(&self) -> ProcessId {
            ProcessId::Customer(self.flow.customer())
        }

        fn resume(&mut self, cx: &mut ProcessContext<'_>, wake: Wake) -> Step<()> {
            match self.flow.resume(cx, wake) {
                Step::Pending(y) => Step::Pending(y),
                Step::Ready(outcome) => {
                    self.outcome.set(Some(outcome));
                    Step::Ready(())
                }
            }
        }
    }

    fn run_support(config: &SimulationConfig, seed: u64) -> (Engine, SupportOutcome) {
        let (engine, _, outcome) = run_with_model(config, seed);
        (engine, outcome)
    }

    fn run_with_model(
        config: &SimulationConfig,
        seed: u64,
    ) -> (Engine, Rc<CallCenterModel>, SupportOutcome) {
        let (mut engine, model) = engine_with_model(config, seed);
        let outcome = Rc::new(Cell::new(None));
        let caller = Caller {
            flow: SupportFlow::new(CustomerId::new(1), Rc::clone(&model)),
            outcome: Rc::clone(&outcome),
        };
        engine.spawn(Box::new(caller));
        run_to_completion(&mut engine);
        let outcome = outcome.get().expect("support flow finished");
        (engine, model, outcome)
    }

    fn runs(engine: &Engine, activity: Activity) -> usize {
        engine.tracker().durations(activity).len()
    }

    #[test]
    fn test_nominal_flow_escalates_when_nothing_helps() {
        let (engine, outcome) = run_support(&quiet_config(), 1);
        assert_eq!(outcome, SupportOutcome::Escalated);
        for activity in [
            Activity::Support,
            Activity::IsConfigCorrect,
            Activity::InitiateDiagnostic,
            Activity::IsUpgradeNeeded,
            Activity::IsHwIssue,
            Activity::QueryRemoteArchives,
            Activity::IsProblemSolved,
        ] {
            assert_eq!(runs(&engine, activity), 1, "{}", activity);
        }
        assert_eq!(runs(&engine, Activity::ConfigureDevice), 0);
        assert_eq!(runs(&engine, Activity::UpdateSoftware), 0);
        assert_eq!(engine.tracker().occupancy(Activity::Support), 0);
    }

    #[test]
    fn test_first_solved_check_ends_the_call() {
        let mut config = quiet_config();
        config.params.required_device_reconfiguration = 1.0;
        config.params.problem_solved_probability = 1.0;
        let (engine, outcome) = run_support(&config, 2);
        assert_eq!(outcome, SupportOutcome::Resolved);
        assert_eq!(runs(&engine, Activity::ResetCachedMemory), 1);
        assert_eq!(runs(&engine, Activity::IsProblemSolved), 1);
        assert_eq!(runs(&engine, Activity::ConfigureDevice), 0);
        assert_eq!(runs(&engine, Activity::InitiateDiagnostic), 0);
    }

    #[test]
    fn test_reordered_repair_configures_first() {
        let mut config = quiet_config();
        config.params.required_device_reconfiguration = 1.0;
        config.params.problem_solved_probability = 1.0;
        config.scenario.path_variants = [PathVariant::ReorderRepair].into_iter().collect();
        let (engine, outcome) = run_support(&config, 3);
        assert_eq!(outcome, SupportOutcome::Resolved);
        let log = engine.tracker().audit_log();
        let first_repair = log.iter().position(|l| l.ends_with("configure_device, entry"));
        let reset = log.iter().position(|l| l.ends_with("reset_cached_memory, entry"));
        assert!(first_repair.unwrap() < reset.unwrap());
    }

    #[test]
    fn test_inserted_reboot_resolves_before_diagnostic() {
        let mut config = quiet_config();
        config.params.needs_reboot_probability = 1.0;
        config.params.problem_solved_probability = 1.0;
        config.scenario.path_variants = [PathVariant::InsertReboot].into_iter().collect();
        let (engine, outcome) = run_support(&config, 4);
        assert_eq!(outcome, SupportOutcome::Resolved);
        assert_eq!(runs(&engine, Activity::RebootDevice), 1);
        for activity in [
            Activity::InitiateDiagnostic,
            Activity::UpdateSoftware,
            Activity::IsHwIssue,
            Activity::QueryRemoteArchives,
        ] {
            assert_eq!(runs(&engine, activity), 0, "{}", activity);
        }
    }

    #[test]
    fn test_reboot_duration_scaled_by_path_delay_factor() {
        let mut config = quiet_config();
        config.params.needs_reboot_probability = 1.0;
        config.scenario.path_variants = [PathVariant::InsertReboot].into_iter().collect();
        config.scenario.path_delay_factor = 10.0;
        let (engine, _) = run_support(&config, 5);
        let reboot = engine.tracker().durations(Activity::RebootDevice);
        // avg_reboot_time 40, sd 4
        assert!(reboot[0] > 200.0, "reboot took {}", reboot[0]);
    }

    #[test]
    fn test_hardware_issue_refers_to_lab() {
        let mut config = quiet_config();
        config.params.hw_issue_probability = 1.0;
        let (engine, outcome) = run_support(&config, 6);
        assert_eq!(outcome, SupportOutcome::HardwareReferral);
        assert_eq!(runs(&engine, Activity::QueryRemoteArchives), 0);
    }

    #[test]
    fn test_update_path_checks_solved_after_update() {
        let mut config = quiet_config();
        config.params.required_device_update = 1.0;
        config.params.problem_solved_probability = 1.0;
        let (engine, outcome) = run_support(&config, 7);
        assert_eq!(outcome, SupportOutcome::Resolved);
        assert_eq!(runs(&engine, Activity::UpdateSoftware), 1);
        assert_eq!(runs(&engine, Activity::IsHwIssue), 0);
    }

    #[test]
    fn test_diagnostic_retries_stay_inside_one_activity() {
        let mut config = quiet_config();
        config.scenario.low_level_failure_probability = 0.9;
        let (engine, _) = run_support(&config, 8);
        assert_eq!(runs(&engine, Activity::InitiateDiagnostic), 1);
        let entries = engine
            .tracker()
            .audit_log()
            .iter()
            .filter(|l| l.ends_with("initiate_diagnostic, entry"))
            .count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_archive_lookup_scaled_by_under_performance() {
        let mut config = quiet_config();
        config.scenario.under_performance_factor = 5.0;
        config.scenario.path_variants = PathVariants::none();
        let (engine, model, _) = run_with_model(&config, 9);
        let lookup = engine.tracker().durations(Activity::QueryRemoteArchives);
        // response time 30, sd 3
        assert!(lookup[0] > 100.0, "lookup took {}", lookup[0]);
        assert_eq!(engine.pool(model.facilities.archive_links).held(), 0);
    }
}
