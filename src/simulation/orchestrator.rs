//! Main simulation orchestrator
//!
//! This module contains the SimulationOrchestrator, which owns the engine,
//! pools, tracker and random stream of one scenario run.

use crate::simulation::{
    ActivityTracker, Engine, RunStatistics, SimTime, SimulationError, SimulationResult,
    RUN_SUMMARY_FILE,
};
use crate::types::SimulationConfig;
use crate::workflow::{ArrivalGenerator, CallCenterModel, MaintenanceProcess};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Controller of a single scenario run
#[derive(Debug)]
pub struct SimulationOrchestrator {
    /// Configuration of this run
    config: SimulationConfig,
    /// Seed of the run's random stream
    seed: u64,
    /// Event loop, pools and processes
    engine: Engine,
    /// Shared activity tracker
    tracker: Arc<ActivityTracker>,
    /// Statistics of the finished run
    statistics: Option<RunStatistics>,
}

impl SimulationOrchestrator {
    /// Validate `config` and prepare a run with the arrival generator and
    /// maintenance process ready to start at t=0
    #[instrument(skip(config), fields(scenario = %config.scenario.name))]
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        config.validate()?;

        let seed = match config.scenario.random_seed {
            Some(seed) => {
                info!("Using deterministic seed: {}", seed);
                seed
            }
            None => {
                let seed = StdRng::from_entropy().gen::<u64>();
                debug!("Using entropy-based random seed: {}", seed);
                seed
            }
        };

        let tracker = Arc::new(ActivityTracker::new());
        let mut engine = Engine::new(StdRng::seed_from_u64(seed), Arc::clone(&tracker));
        let model = Rc::new(CallCenterModel::build(
            &mut engine,
            config.params.clone(),
            config.scenario.clone(),
        ));
        engine.spawn(Box::new(ArrivalGenerator::new(Rc::clone(&model), &config.run)));
        engine.spawn(Box::new(MaintenanceProcess::new(model)));

        info!(
            bots = config.params.num_of_bots,
            customers = config.run.num_of_customers,
            horizon = config.run.sim_time,
            "Simulation prepared"
        );

        Ok(Self { config, seed, engine, tracker, statistics: None })
    }

    /// Seed actually used for the random stream
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Configuration of this run
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Shared activity tracker
    pub fn tracker(&self) -> &Arc<ActivityTracker> {
        &self.tracker
    }

    /// Current virtual time
    pub fn now(&self) -> SimTime {
        self.engine.now()
    }

    /// Statistics of the finished run, if it has run
    pub fn statistics(&self) -> Option<&RunStatistics> {
        self.statistics.as_ref()
    }

    /// Run the configured horizon
    pub fn run(&mut self) -> SimulationResult<RunStatistics> {
        self.run_until(self.config.run.sim_time)
    }

    /// Fire every event due strictly before `horizon`, then stop
    ///
    /// Pending events are discarded and suspended processes abandoned; the
    /// clock ends at `horizon`. A run can only be driven once.
    #[instrument(skip(self), fields(seed = self.seed))]
    pub fn run_until(&mut self, horizon: f64) -> SimulationResult<RunStatistics> {
        if self.statistics.is_some() {
            return Err(SimulationError::AlreadyFinished(self.engine.now().as_f64()));
        }
        if !horizon.is_finite() || horizon <= 0.0 {
            return Err(SimulationError::configuration_error(format!(
                "horizon must be a positive finite time, got {}",
                horizon
            )));
        }

        info!("Starting simulation until t={}", horizon);
        let started = Instant::now();
        let until = SimTime::new(horizon);
        while self.engine.step_before(until) {}
        let (events_discarded, processes_abandoned) = self.engine.truncate(until);
        self.tracker.mark_ended();
        let wall_clock = started.elapsed();

        let statistics = RunStatistics {
            scenario: self.config.scenario.name.clone(),
            seed: self.seed,
            horizon,
            final_clock: self.engine.now().as_f64(),
            events_processed: self.engine.events_processed(),
            events_discarded,
            processes_abandoned,
            counters: self.engine.counters(),
            pools: self.engine.pool_stats(),
            activities: self.tracker.report(),
            wall_clock,
        };
        info!("{}", statistics.compact_summary());
        self.statistics = Some(statistics.clone());
        Ok(statistics)
    }

    /// Write the activity files and `run_summary.json` into `dir`
    pub fn export_statistics<P: AsRef<Path>>(&self, dir: P) -> SimulationResult<()> {
        let dir = dir.as_ref();
        let statistics = self
            .statistics
            .as_ref()
            .ok_or_else(|| SimulationError::export_error("simulation has not been run"))?;
        self.tracker.export_snapshot(dir)?;
        fs::write(dir.join(RUN_SUMMARY_FILE), statistics.to_json()?)?;
        debug!("Run summary written to {}", dir.display());
        Ok(())
    }
}
