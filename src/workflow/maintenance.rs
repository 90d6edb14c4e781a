//! Background maintenance loop competing with customers for the database

use super::CallCenterModel;
use crate::simulation::{Guard, Process, ProcessContext, Step, Wake};
use crate::types::{ProcessId, MAINTENANCE_ID_BASE};
use std::rc::Rc;
use tracing::info;

#[derive(Debug)]
enum MaintenanceStep {
    Idle,
    Local,
    Connecting,
    Database(Guard),
    Finishing,
}

/// Endless three-step maintenance cycle
///
/// Step 1 and step 3 run locally and are sped up by the scenario's
/// over-performance factor; step 2 holds a database connection.
#[derive(Debug)]
pub struct MaintenanceProcess {
    model: Rc<CallCenterModel>,
    cycle: u64,
    step: MaintenanceStep,
}

impl MaintenanceProcess {
    /// Create the maintenance loop; the first cycle is [`MAINTENANCE_ID_BASE`]
    pub fn new(model: Rc<CallCenterModel>) -> Self {
        Self { model, cycle: MAINTENANCE_ID_BASE, step: MaintenanceStep::Idle }
    }

    /// Id of the cycle in progress
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    fn start_cycle(&mut self, cx: &mut ProcessContext<'_>) -> Step<()> {
        let factor = self.model.scenario.task_over_performance_factor;
        self.step = MaintenanceStep::Local;
        Step::timeout(cx.sample(self.model.params.maintenance_step_1_duration / factor))
    }
}

impl Process for MaintenanceProcess {
    fn id(&self) -> ProcessId {
        ProcessId::Maintenance
    }

    fn resume(&mut self, cx: &mut ProcessContext<'_>, wake: Wake) -> Step<()> {
        match (std::mem::replace(&mut self.step, MaintenanceStep::Idle), wake) {
            (MaintenanceStep::Idle, Wake::Start) => self.start_cycle(cx),
            (MaintenanceStep::Local, Wake::Timer) => {
                info!(cycle = self.cycle, "Maintenance process step 1/3");
                self.step = MaintenanceStep::Connecting;
                Step::acquire(self.model.database.connections())
            }
            (MaintenanceStep::Connecting, Wake::Granted(connection)) => {
                self.step = MaintenanceStep::Database(connection);
                Step::timeout(cx.sample(self.model.params.maintenance_step_2_db_duration))
            }
            (MaintenanceStep::Database(connection), Wake::Timer) => {
                info!(cycle = self.cycle, "Maintenance process step 2/3");
                drop(connection);
                let factor = self.model.scenario.task_over_performance_factor;
                self.step = MaintenanceStep::Finishing;
                Step::timeout(cx.sample(self.model.params.maintenance_step_3_duration) / factor)
            }
            (MaintenanceStep::Finishing, Wake::Timer) => {
                info!(cycle = self.cycle, "Maintenance process step 3/3");
                cx.counters().increment_maintenance_cycles();
                self.cycle += 1;
                self.start_cycle(cx)
            }
            (step, wake) => panic!("maintenance in step {:?} cannot handle {:?}", step, wake),
        }
    }
}
