//! Batch runner for scenario files
//!
//! This module discovers the scenario groups of a directory, numbers their
//! test cases, and runs each scenario in its own output directory with its own
//! event log.

use chrono::{DateTime, TimeZone};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::simulation::{
    LoggingConfig, RunStatistics, SimulationError, SimulationOrchestrator, SimulationResult,
};
use crate::types::{Scenario, ScenarioFile, SimulationConfig};

/// Scenarios loaded from one scenario file
#[derive(Debug, Clone)]
pub struct ScenarioGroup {
    /// File stem, used as the group directory name
    pub name: String,
    /// Scenarios in file order
    pub scenarios: Vec<Scenario>,
}

impl ScenarioGroup {
    /// Load the group stored in `path`
    pub fn load<P: AsRef<Path>>(path: P) -> SimulationResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| SimulationError::scenario_error(format!("bad file name {:?}", path)))?
            .to_string();
        let file = ScenarioFile::load(path)?;
        Ok(Self { name, scenarios: file.sim_scenarios })
    }

    /// Load every `*.json` file of `dir`, sorted by file name
    pub fn discover<P: AsRef<Path>>(dir: P) -> SimulationResult<Vec<Self>> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(SimulationError::scenario_error(format!(
                "scenario directory not found: {}",
                dir.display()
            )));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        paths.iter().map(Self::load).collect()
    }
}

/// One scenario placed in the output layout
#[derive(Debug, Clone)]
pub struct TestCase {
    /// Group the scenario came from
    pub group: String,
    /// Test case number
    pub index: usize,
    /// Scenario to run
    pub scenario: Scenario,
}

impl TestCase {
    /// Directory name `TC<index>_<name>`
    pub fn dir_name(&self) -> String {
        format!("TC{}_{}", self.index, self.scenario.name)
    }

    /// Output directory under the run root
    pub fn run_dir(&self, run_root: &Path) -> PathBuf {
        run_root.join(&self.group).join(self.dir_name())
    }
}

/// Number the scenarios of every group
///
/// The first scenario of each group is case 1; every later scenario takes the
/// next value of a counter shared by all groups.
pub fn plan_test_cases(groups: &[ScenarioGroup]) -> Vec<TestCase> {
    let mut counter = 1;
    let mut cases = Vec::new();
    for group in groups {
        for (position, scenario) in group.scenarios.iter().enumerate() {
            let index = if position == 0 {
                1
            } else {
                counter += 1;
                counter
            };
            cases.push(TestCase { group: group.name.clone(), index, scenario: scenario.clone() });
        }
    }
    cases
}

/// Directory-safe timestamp naming one invocation, e.g. `2024-03-01_09-30-00`
pub fn run_timestamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// Runs test cases with a shared base configuration
#[derive(Debug)]
pub struct BatchRunner {
    /// Parameters shared by every scenario
    base: SimulationConfig,
    /// Console and event log settings
    logging: LoggingConfig,
    /// `<output>/<timestamp>`
    run_root: PathBuf,
}

impl BatchRunner {
    /// Create a runner writing below `run_root`
    pub fn new(
        base: SimulationConfig,
        logging: LoggingConfig,
        run_root: impl Into<PathBuf>,
    ) -> Self {
        Self { base, logging, run_root: run_root.into() }
    }

    /// Root directory of this invocation
    pub fn run_root(&self) -> &Path {
        &self.run_root
    }

    /// Run one test case and export its statistics into its run directory
    #[instrument(skip(self, case), fields(group = %case.group, case = case.index))]
    pub fn run_case(&self, case: &TestCase) -> SimulationResult<RunStatistics> {
        let dir = case.run_dir(&self.run_root);
        fs::create_dir_all(&dir)?;

        let mut orchestrator =
            SimulationOrchestrator::new(self.base.with_scenario(case.scenario.clone()))?;
        let log = self
            .logging
            .run_log(&dir, orchestrator.seed())
            .map_err(|e| SimulationError::export_error(format!("event log: {}", e)))?;

        let statistics = log.in_scope(|| orchestrator.run())?;
        orchestrator.export_statistics(&dir)?;
        info!(dir = %dir.display(), "Test case finished");
        Ok(statistics)
    }
}
