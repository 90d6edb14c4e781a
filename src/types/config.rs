//! Configuration structures for the call center simulator
//!
//! This module contains the call center parameters, the per-scenario settings
//! loaded from scenario files, the command line interface and the validation
//! logic that guards all of them.
//!
//! Configuration is layered: built-in defaults, then an optional JSON parameter
//! file, then command line overrides. Scenario files are loaded separately and
//! combined with the layered base configuration one scenario at a time.

use super::PathVariants;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "call-center-sim",
    version = "0.1.0",
    about = "Call Center Simulator - discrete-event simulation of a digital support center",
    long_about = "Runs every scenario found in the scenario directory through a discrete-event simulation of a digital call center: customers register, queue for support bots, go through a multi-step triage workflow and compete with a maintenance process for database connections.

EXAMPLES:
    # Run every scenario file in ./tc_configurations
    call-center-sim

    # Use another scenario directory and output root
    call-center-sim --scenarios my_scenarios --output results

    # Override call center parameters from a file
    call-center-sim --config params.json

    # Generate a parameter template
    call-center-sim --print-config > params.json

    # Validate parameters and scenario files without running
    call-center-sim --dry-run

CONFIGURATION:
    Parameters can be provided via:
    1. Command line arguments (highest priority)
    2. Parameter file (--config flag)
    3. Default values (lowest priority)

    Scenario files are JSON documents with a top-level \"sim_scenarios\" list."
)]
pub struct CliArgs {
    /// Directory containing scenario files (*.json)
    #[arg(short, long, default_value = "tc_configurations", help = "Scenario directory")]
    pub scenarios: String,

    /// Root directory for per-run output
    #[arg(short, long, default_value = "test_cases", help = "Output root directory")]
    pub output: String,

    /// Parameter file path (JSON format)
    #[arg(
        short,
        long,
        help = "Parameter file path (JSON format)",
        long_help = "Path to a JSON file with call center and run parameters. CLI arguments override file settings."
    )]
    pub config: Option<String>,

    /// Simulation horizon in virtual time units
    #[arg(long, help = "Simulation horizon (virtual time units)")]
    pub sim_time: Option<f64>,

    /// Number of customers to generate (0 = unbounded)
    #[arg(long, help = "Number of customers to generate (0 = unbounded)")]
    pub customers: Option<usize>,

    /// Mean time between customer arrivals
    #[arg(long, help = "Mean time between customer arrivals")]
    pub customer_interval: Option<u64>,

    /// Number of support bots
    #[arg(long, help = "Number of support bots")]
    pub bots: Option<usize>,

    /// Number of database connections
    #[arg(long, help = "Number of database connections")]
    pub db_connections: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Dry run mode - validate configuration without running simulation
    #[arg(long, help = "Validate configuration and scenario files without running")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default parameters in JSON format and exit")]
    pub print_config: bool,
}

/// Call center, database, maintenance and customer parameters
///
/// Durations are nominal centres for [`crate::simulation::TimeVariance`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CallCenterParams {
    /// Number of support bots serving calls concurrently
    pub num_of_bots: usize,
    /// Concurrent links to the remote legacy archives
    pub num_of_remote_legacy_archives_connections: usize,
    /// Workers available to close incidents after a call
    pub num_of_updaters: usize,
    /// Database connection pool size
    pub num_of_db_connections: usize,

    /// Incident update time
    pub avg_incident_update_time: f64,
    /// Device diagnostic time (per attempt)
    pub avg_diagnostic_time: f64,
    /// Hardware diagnostic time
    pub avg_hw_diagnostic_time: f64,
    /// Time to confirm with the customer whether the problem is solved
    pub avg_check_problem_solved_time: f64,
    /// Time to check whether an update is needed
    pub avg_check_update_needed_time: f64,
    /// Time to check the device configuration
    pub avg_check_config_time: f64,
    /// Software update time
    pub avg_update_time: f64,
    /// Device configuration time
    pub avg_conf_time: f64,
    /// Cache reset time
    pub avg_reset_cache_time: f64,
    /// Reboot time
    pub avg_reboot_time: f64,
    /// Remote legacy archive response time, before the under-performance factor
    pub remote_legacy_archives_response_time: f64,

    /// Probability that the reboot step is inserted when path variant 2 is enabled
    pub needs_reboot_probability: f64,
    /// Probability that a device is misconfigured
    pub required_device_reconfiguration: f64,
    /// Probability that a device needs a software update
    pub required_device_update: f64,
    /// Probability that a solved check succeeds
    pub problem_solved_probability: f64,
    /// Probability that the hardware diagnostic finds a fault
    pub hw_issue_probability: f64,

    /// Database lookup time
    pub avg_db_query_time: f64,
    /// Database insert time
    pub avg_db_insert_time: f64,
    /// Probability that an identify lookup finds the customer not eligible
    pub failed_identification_rate: f64,

    /// Maintenance step 1 duration (local)
    pub maintenance_step_1_duration: f64,
    /// Maintenance step 2 duration (holds a database connection)
    pub maintenance_step_2_db_duration: f64,
    /// Maintenance step 3 duration (local)
    pub maintenance_step_3_duration: f64,

    /// Time to register a new customer
    pub register_new_customer_time: f64,
    /// Probability that registration of a new customer fails
    pub registration_failure_rate: f64,
}

impl Default for CallCenterParams {
    fn default() -> Self {
        let num_of_bots = 100;
        Self {
            num_of_bots,
            num_of_remote_legacy_archives_connections: num_of_bots / 20,
            num_of_updaters: 30,
            num_of_db_connections: 60,
            avg_incident_update_time: 1.0,
            avg_diagnostic_time: 15.0,
            avg_hw_diagnostic_time: 13.0,
            avg_check_problem_solved_time: 6.0,
            avg_check_update_needed_time: 25.0,
            avg_check_config_time: 16.0,
            avg_update_time: 60.0,
            avg_conf_time: 30.0,
            avg_reset_cache_time: 5.0,
            avg_reboot_time: 40.0,
            remote_legacy_archives_response_time: 30.0,
            needs_reboot_probability: 0.5,
            required_device_reconfiguration: 0.1,
            required_device_update: 0.5,
            problem_solved_probability: 0.5,
            hw_issue_probability: 0.1,
            avg_db_query_time: 5.0,
            avg_db_insert_time: 1.0,
            failed_identification_rate: 0.2,
            maintenance_step_1_duration: 10.0,
            maintenance_step_2_db_duration: 10.0,
            maintenance_step_3_duration: 10.0,
            register_new_customer_time: 30.0,
            registration_failure_rate: 0.3,
        }
    }
}

/// Run-level parameters: horizon and arrival process
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunParams {
    /// Simulation horizon in virtual time units
    pub sim_time: f64,
    /// Number of customers to generate; 0 keeps generating until the horizon
    pub num_of_customers: usize,
    /// Mean inter-arrival time; actual gaps are uniform in `interval-1..=interval+1`
    pub customer_interval: u64,
}

impl Default for RunParams {
    fn default() -> Self {
        Self { sim_time: 3600.0, num_of_customers: 1000, customer_interval: 5 }
    }
}

/// One simulation scenario as written in a scenario file
///
/// Missing fields default to neutral values: zero failure probabilities,
/// factors of 1 and no path variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Scenario {
    /// Display name, also used for the run directory
    pub name: String,
    /// Free-form description
    #[serde(rename = "Description")]
    pub description: String,
    /// Seed for the run's random stream; entropy-seeded when absent
    pub random_seed: Option<u64>,
    /// Probability driving registration/identification retry loops
    #[serde(rename = "high_level_op_failure_probability")]
    pub high_level_failure_probability: f64,
    /// Probability that a low-level operation fails and is retried
    #[serde(rename = "low_level_op_failure_probability")]
    pub low_level_failure_probability: f64,
    /// Multiplier applied to remote archive latency
    pub under_performance_factor: f64,
    /// Enabled support-flow variants
    #[serde(rename = "enable_path_changes")]
    pub path_variants: PathVariants,
    /// Multiplier applied to the duration of steps a variant inserts
    #[serde(rename = "delay_change_path_factor")]
    pub path_delay_factor: f64,
    /// Divisor applied to the local maintenance step durations
    pub task_over_performance_factor: f64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            description: String::new(),
            random_seed: None,
            high_level_failure_probability: 0.0,
            low_level_failure_probability: 0.0,
            under_performance_factor: 1.0,
            path_variants: PathVariants::none(),
            path_delay_factor: 1.0,
            task_over_performance_factor: 1.0,
        }
    }
}

/// Scenario file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    /// Scenarios in the order they are run
    pub sim_scenarios: Vec<Scenario>,
}

impl ScenarioFile {
    /// Load a scenario file (JSON)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Parameter file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Call center parameters
    pub params: Option<CallCenterParams>,
    /// Run parameters
    pub run: Option<RunParams>,
}

/// Complete configuration of one simulation run
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SimulationConfig {
    /// Call center parameters
    pub params: CallCenterParams,
    /// Horizon and arrival process
    pub run: RunParams,
    /// Scenario being simulated
    pub scenario: Scenario,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for simulation configuration
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigValidationError {
    /// Probability value is out of range
    #[error("Invalid probability for {field}: {value} (must be between 0.0 and 1.0)")]
    InvalidProbability {
        /// Name of the field
        field: String,
        /// The invalid value
        value: f64,
    },

    /// A resource pool would have no capacity
    #[error("Capacity of {0} must be greater than 0")]
    InvalidCapacity(String),

    /// A duration is not a finite positive number
    #[error("Invalid duration for {field}: {value} (must be finite and > 0)")]
    InvalidDuration {
        /// Name of the field
        field: String,
        /// The invalid value
        value: f64,
    },

    /// A scaling factor is not a finite positive number
    #[error("Invalid factor for {field}: {value} (must be finite and > 0)")]
    InvalidFactor {
        /// Name of the field
        field: String,
        /// The invalid value
        value: f64,
    },

    /// Horizon is invalid
    #[error("Simulation time must be finite and greater than 0, got {0}")]
    InvalidHorizon(f64),

    /// Inter-arrival time is invalid
    #[error("Customer interval must be at least 1, got {0}")]
    InvalidInterval(u64),
}

impl SimulationConfig {
    /// Create a configuration with default parameters for `scenario`
    pub fn for_scenario(scenario: Scenario) -> Self {
        Self { scenario, ..Default::default() }
    }

    /// Create a base configuration from parsed CLI arguments
    pub fn from_cli_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load parameters from a file, merging with defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            params: config_file.params.unwrap_or(defaults.params),
            run: config_file.run.unwrap_or(defaults.run),
            scenario: defaults.scenario,
        }
    }

    fn apply_cli_overrides(config: &mut Self, args: &CliArgs) {
        if let Some(value) = args.sim_time {
            config.run.sim_time = value;
        }
        if let Some(value) = args.customers {
            config.run.num_of_customers = value;
        }
        if let Some(value) = args.customer_interval {
            config.run.customer_interval = value;
        }
        if let Some(value) = args.bots {
            config.params.num_of_bots = value;
        }
        if let Some(value) = args.db_connections {
            config.params.num_of_db_connections = value;
        }
    }

    /// Same parameters, different scenario
    pub fn with_scenario(&self, scenario: Scenario) -> Self {
        Self { params: self.params.clone(), run: self.run.clone(), scenario }
    }

    /// Print parameters as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        let file = ConfigFile { params: Some(self.params.clone()), run: Some(self.run.clone()) };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Validate parameters, run settings and the scenario
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let p = &self.params;

        for (field, capacity) in [
            ("num_of_bots", p.num_of_bots),
            (
                "num_of_remote_legacy_archives_connections",
                p.num_of_remote_legacy_archives_connections,
            ),
            ("num_of_updaters", p.num_of_updaters),
            ("num_of_db_connections", p.num_of_db_connections),
        ] {
            if capacity == 0 {
                return Err(ConfigValidationError::InvalidCapacity(field.to_string()));
            }
        }

        for (field, value) in [
            ("avg_incident_update_time", p.avg_incident_update_time),
            ("avg_diagnostic_time", p.avg_diagnostic_time),
            ("avg_hw_diagnostic_time", p.avg_hw_diagnostic_time),
            ("avg_check_problem_solved_time", p.avg_check_problem_solved_time),
            ("avg_check_update_needed_time", p.avg_check_update_needed_time),
            ("avg_check_config_time", p.avg_check_config_time),
            ("avg_update_time", p.avg_update_time),
            ("avg_conf_time", p.avg_conf_time),
            ("avg_reset_cache_time", p.avg_reset_cache_time),
            ("avg_reboot_time", p.avg_reboot_time),
            ("remote_legacy_archives_response_time", p.remote_legacy_archives_response_time),
            ("avg_db_query_time", p.avg_db_query_time),
            ("avg_db_insert_time", p.avg_db_insert_time),
            ("maintenance_step_1_duration", p.maintenance_step_1_duration),
            ("maintenance_step_2_db_duration", p.maintenance_step_2_db_duration),
            ("maintenance_step_3_duration", p.maintenance_step_3_duration),
            ("register_new_customer_time", p.register_new_customer_time),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigValidationError::InvalidDuration {
                    field: field.to_string(),
                    value,
                });
            }
        }

        self.validate_probability("needs_reboot_probability", p.needs_reboot_probability)?;
        self.validate_probability(
            "required_device_reconfiguration",
            p.required_device_reconfiguration,
        )?;
        self.validate_probability("required_device_update", p.required_device_update)?;
        self.validate_probability("problem_solved_probability", p.problem_solved_probability)?;
        self.validate_probability("hw_issue_probability", p.hw_issue_probability)?;
        self.validate_probability("failed_identification_rate", p.failed_identification_rate)?;
        self.validate_probability("registration_failure_rate", p.registration_failure_rate)?;

        if !self.run.sim_time.is_finite() || self.run.sim_time <= 0.0 {
            return Err(ConfigValidationError::InvalidHorizon(self.run.sim_time));
        }
        if self.run.customer_interval == 0 {
            return Err(ConfigValidationError::InvalidInterval(self.run.customer_interval));
        }

        self.validate_scenario()
    }

    fn validate_scenario(&self) -> Result<(), ConfigValidationError> {
        let s = &self.scenario;
        self.validate_probability(
            "high_level_op_failure_probability",
            s.high_level_failure_probability,
        )?;
        self.validate_probability(
            "low_level_op_failure_probability",
            s.low_level_failure_probability,
        )?;
        // A retry loop with probability 1 never terminates.
        for (field, value) in [
            ("high_level_op_failure_probability", s.high_level_failure_probability),
            ("low_level_op_failure_probability", s.low_level_failure_probability),
        ] {
            if value >= 1.0 {
                return Err(ConfigValidationError::InvalidProbability {
                    field: field.to_string(),
                    value,
                });
            }
        }

        for (field, value) in [
            ("under_performance_factor", s.under_performance_factor),
            ("delay_change_path_factor", s.path_delay_factor),
            ("task_over_performance_factor", s.task_over_performance_factor),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigValidationError::InvalidFactor {
                    field: field.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }

    fn validate_probability(&self, field: &str, value: f64) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigValidationError::InvalidProbability {
                field: field.to_string(),
                value,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PathVariant;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_call_center_params_default() {
        let params = CallCenterParams::default();
        assert_eq!(params.num_of_bots, 100);
        assert_eq!(params.num_of_remote_legacy_archives_connections, 5);
        assert_eq!(params.num_of_updaters, 30);
        assert_eq!(params.num_of_db_connections, 60);
        assert_eq!(params.problem_solved_probability, 0.5);
        assert_eq!(params.registration_failure_rate, 0.3);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_scenario_missing_fields_default_to_neutral() {
        let scenario: Scenario =
            serde_json::from_str(r#"{"name": "baseline", "Description": "nothing special"}"#)
                .unwrap();
        assert_eq!(scenario.name, "baseline");
        assert_eq!(scenario.description, "nothing special");
        assert_eq!(scenario.random_seed, None);
        assert_eq!(scenario.high_level_failure_probability, 0.0);
        assert_eq!(scenario.low_level_failure_probability, 0.0);
        assert_eq!(scenario.under_performance_factor, 1.0);
        assert_eq!(scenario.task_over_performance_factor, 1.0);
        assert!(scenario.path_variants.is_nominal());
    }

    #[test]
    fn test_scenario_full_fields() {
        let json = r#"{
            "name": "slow archives",
            "Description": "archives twice as slow",
            "random_seed": 17,
            "high_level_op_failure_probability": 0.1,
            "low_level_op_failure_probability": 0.2,
            "under_performance_factor": 2,
            "enable_path_changes": [1, 2],
            "delay_change_path_factor": 1.5,
            "task_over_performance_factor": 4
        }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert_eq!(scenario.random_seed, Some(17));
        assert_eq!(scenario.high_level_failure_probability, 0.1);
        assert_eq!(scenario.low_level_failure_probability, 0.2);
        assert_eq!(scenario.under_performance_factor, 2.0);
        assert!(scenario.path_variants.contains(PathVariant::ReorderRepair));
        assert!(scenario.path_variants.contains(PathVariant::InsertReboot));
        assert_eq!(scenario.path_delay_factor, 1.5);
        assert_eq!(scenario.task_over_performance_factor, 4.0);
    }

    #[test]
    fn test_scenario_file_loading() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"sim_scenarios": [
                {{"name": "a", "random_seed": 1}},
                {{"name": "b", "enable_path_changes": 2}}
            ]}}"#
        )
        .unwrap();

        let loaded = ScenarioFile::load(file.path()).unwrap();
        assert_eq!(loaded.sim_scenarios.len(), 2);
        assert_eq!(loaded.sim_scenarios[0].name, "a");
        assert!(loaded.sim_scenarios[1].path_variants.contains(PathVariant::InsertReboot));
    }

    #[test]
    fn test_scenario_file_not_found() {
        let result = ScenarioFile::load("/definitely/not/here.json");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_config_file_partial_params() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"params": {{"num_of_bots": 3}}, "run": {{"sim_time": 50}}}}"#).unwrap();

        let config = SimulationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.params.num_of_bots, 3);
        assert_eq!(config.params.num_of_updaters, 30);
        assert_eq!(config.run.sim_time, 50.0);
        assert_eq!(config.run.num_of_customers, 1000);
    }

    #[test]
    fn test_config_file_unsupported_extension() {
        let file = Builder::new().suffix(".toml").tempfile().unwrap();
        let result = SimulationConfig::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_cli_overrides() {
        let args = CliArgs::try_parse_from([
            "test",
            "--sim-time",
            "120",
            "--customers",
            "10",
            "--customer-interval",
            "3",
            "--bots",
            "4",
        ])
        .unwrap();
        let config = SimulationConfig::from_cli_args(&args).unwrap();
        assert_eq!(config.run.sim_time, 120.0);
        assert_eq!(config.run.num_of_customers, 10);
        assert_eq!(config.run.customer_interval, 3);
        assert_eq!(config.params.num_of_bots, 4);
        assert_eq!(config.params.num_of_db_connections, 60);
    }

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::try_parse_from(["test"]).unwrap();
        assert_eq!(args.scenarios, "tc_configurations");
        assert_eq!(args.output, "test_cases");
        assert!(args.config.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn test_validation_rejects_bad_probability() {
        let mut config = SimulationConfig::default();
        config.params.problem_solved_probability = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_certain_retry_failure() {
        let mut config = SimulationConfig::default();
        config.scenario.low_level_failure_probability = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_zero_capacity() {
        let mut config = SimulationConfig::default();
        config.params.num_of_updaters = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidCapacity("num_of_updaters".to_string()))
        );
    }

    #[test]
    fn test_validation_rejects_zero_factor() {
        let mut config = SimulationConfig::default();
        config.scenario.task_over_performance_factor = 0.0;
        assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidFactor { .. })));
    }

    #[test]
    fn test_validation_rejects_bad_horizon_and_interval() {
        let mut config = SimulationConfig::default();
        config.run.sim_time = 0.0;
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidHorizon(0.0)));

        let mut config = SimulationConfig::default();
        config.run.customer_interval = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidInterval(0)));
    }

    #[test]
    fn test_print_json_roundtrips() {
        let config = SimulationConfig::default();
        let json = config.print_json().unwrap();
        let parsed: ConfigFile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.params, Some(config.params));
    }
}
