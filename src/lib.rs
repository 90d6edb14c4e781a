//! Call Center Simulator
//!
//! A discrete-event simulation of a digital call center: customers register,
//! queue for support bots, go through a multi-step triage workflow and compete
//! with a background maintenance process for database connections.
//!
//! # Overview
//!
//! Every scenario runs in virtual time on a single thread. Workflows are
//! explicit state machines that suspend on timers or resource-pool
//! acquisitions; the engine resumes them in time order, so a run is fully
//! reproducible for a given seed.
//!
//! ## Key Features
//!
//! - **Deterministic kernel**: one seeded random stream, ties broken by submission order
//! - **FIFO resource pools**: bots, archive links, updaters and database connections
//! - **Activity tracking**: occupancy history, audit log and runtimes per activity
//! - **Scenario knobs**: failure probabilities, performance factors and path variants
//!
//! ## Quick Start
//!
//! ```rust
//! use call_center_sim::*;
//!
//! let mut config = SimulationConfig::for_scenario(Scenario {
//!     name: "baseline".to_string(),
//!     random_seed: Some(42),
//!     ..Default::default()
//! });
//! config.run.sim_time = 600.0;
//!
//! let mut orchestrator = SimulationOrchestrator::new(config)?;
//! let stats = orchestrator.run()?;
//! println!("{}", stats.compact_summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: identifiers, enums and configuration
//! - [`simulation`]: kernel, pools, tracker, orchestration and statistics
//! - [`workflow`]: customer, support, maintenance and arrival processes
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │  Workflow   │    │ Simulation  │
//! │             │    │             │    │             │
//! │ Identifiers │◄───┤ Customer    │◄───┤ Orchestrator│
//! │ Enums       │    │ Support     │    │ Engine      │
//! │ Config      │    │ Maintenance │    │ Tracker     │
//! └─────────────┘    └─────────────┘    └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod simulation;
pub mod types;
pub mod workflow;

// Core types and identifiers
pub use types::{
    Activity,
    CallCenterParams,
    ConfigValidationError,
    // Identifiers
    CustomerId,
    // Enums
    PathVariant,
    PathVariants,
    ProcessId,
    RunParams,
    // Configuration
    Scenario,
    SimulationConfig,
    SupportOutcome,
};

// Simulation types and functionality
pub use simulation::{
    ActivityTracker, BatchRunner, Engine, ResourcePool, RetryPolicy, RunStatistics, Scheduler,
    SimTime, SimulationError, SimulationOrchestrator,
};

// Workflow processes
pub use workflow::{ArrivalGenerator, CallCenterModel, CustomerProcess, MaintenanceProcess};
