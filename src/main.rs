// Call Center Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/call-center-sim
// ```
//
// Or with another scenario directory and output root:
//
// ```console
// $ ./target/release/call-center-sim --scenarios my_scenarios --output results --verbose
// ```

use anyhow::{Context, Result};
use call_center_sim::simulation::{
    plan_test_cases, run_timestamp, BatchRunner, LoggingConfig, ScenarioGroup,
};
use call_center_sim::types::config::CliArgs;
use call_center_sim::types::SimulationConfig;
use clap::Parser;
use std::path::Path;
use std::process;
use tracing::{error, info, warn};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    // Handle special CLI flags that don't require full initialization
    if args.print_config {
        match SimulationConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    let logging = LoggingConfig::for_cli(args.verbose, args.debug);
    if let Err(e) = logging.clone().init() {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(&args, logging) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: &CliArgs, logging: LoggingConfig) -> Result<()> {
    info!("Starting Call Center Simulator");

    let config = SimulationConfig::from_cli_args(args).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    let groups = ScenarioGroup::discover(&args.scenarios)
        .with_context(|| format!("Failed to load scenarios from {}", args.scenarios))?;
    let cases = plan_test_cases(&groups);

    // Every scenario must be valid on top of the base parameters
    for case in &cases {
        config
            .with_scenario(case.scenario.clone())
            .validate()
            .with_context(|| format!("Invalid scenario {}/{}", case.group, case.scenario.name))?;
    }

    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - simulation will not be executed.");
        print_configuration_summary(&config, &groups);
        return Ok(());
    }

    print_startup_banner(&config, &groups);

    let run_root = Path::new(&args.output).join(run_timestamp(&chrono::Local::now()));
    let runner = BatchRunner::new(config, logging, run_root);

    for case in &cases {
        let scenario = &case.scenario;
        eprintln!("{}: \"{}\",  \"{}\"", case.group, scenario.name, scenario.description);
        match scenario.random_seed {
            Some(seed) => eprintln!("Random Seed: {}", seed),
            None => eprintln!("Random Seed: (entropy)"),
        }

        match runner.run_case(case) {
            Ok(stats) => eprintln!("{}", stats.generate_summary_report()),
            Err(e) if e.is_recoverable() => {
                warn!(category = e.category(), "Test case {} failed: {}", case.dir_name(), e);
                eprintln!("Test case {} failed: {}", case.dir_name(), e);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Test case {} failed", case.dir_name()))
            }
        }
    }

    eprintln!("*** Simulation ended ***");
    eprintln!("Results written to {}", runner.run_root().display());
    Ok(())
}

/// Print startup banner and configuration summary
fn print_startup_banner(config: &SimulationConfig, groups: &[ScenarioGroup]) {
    eprintln!("Call Center Simulator");
    eprintln!("=====================");
    eprintln!("Discrete-event simulation of a digital support center");
    eprintln!();

    print_configuration_summary(config, groups);
}

/// Print configuration summary
fn print_configuration_summary(config: &SimulationConfig, groups: &[ScenarioGroup]) {
    let p = &config.params;
    eprintln!("Configuration:");
    eprintln!("  Bots: {}", p.num_of_bots);
    eprintln!("  Remote Archive Links: {}", p.num_of_remote_legacy_archives_connections);
    eprintln!("  Updaters: {}", p.num_of_updaters);
    eprintln!("  DB Connections: {}", p.num_of_db_connections);
    eprintln!("  Horizon: {}", config.run.sim_time);
    if config.run.num_of_customers == 0 {
        eprintln!("  Customers: unbounded");
    } else {
        eprintln!("  Customers: {}", config.run.num_of_customers);
    }
    eprintln!("  Customer Interval: {}", config.run.customer_interval);

    eprintln!("\nScenario Groups:");
    for group in groups {
        eprintln!("  {}: {} scenario(s)", group.name, group.scenarios.len());
    }
    eprintln!();
}
