//! Simulation kernel and run control
//!
//! This module contains the discrete-event kernel, the resource pools, the
//! activity tracker, the orchestrator of a single run, statistics collection
//! and error handling.
//!
//! # Overview
//!
//! - **Scheduler**: time-ordered event queue with submission-order ties
//! - **Engine**: drives [`Process`] state machines from the scheduler
//! - **ResourcePool**: fixed-capacity FIFO pool handing units to waiters
//! - **ActivityTracker**: occupancy history, audit log and runtimes per activity
//! - **RetryPolicy**: probabilistic retry loop shared by the workflows
//! - **SimulationOrchestrator**: builds the model for a scenario and runs it
//! - **BatchRunner**: lays out and runs the scenarios of a scenario directory
//!
//! # Usage Example
//!
//! ```rust
//! use call_center_sim::simulation::*;
//! use call_center_sim::types::*;
//!
//! let mut config = SimulationConfig::for_scenario(Scenario {
//!     name: "doc".to_string(),
//!     random_seed: Some(1),
//!     ..Default::default()
//! });
//! config.run.sim_time = 120.0;
//!
//! let mut orchestrator = SimulationOrchestrator::new(config).unwrap();
//! let stats = orchestrator.run().unwrap();
//! assert_eq!(stats.final_clock, 120.0);
//! ```

pub mod activity_tracker;
pub mod batch_runner;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod process;
pub mod resource;
pub mod retry;
pub mod scheduler;
pub mod statistics;
pub mod time_manager;
pub mod time_variance;

// Re-export all public types for convenience
pub use activity_tracker::*;
pub use batch_runner::*;
pub use error::*;
pub use logging::*;
pub use orchestrator::*;
pub use process::*;
pub use resource::*;
pub use retry::*;
pub use scheduler::*;
pub use statistics::*;
pub use time_manager::*;
pub use time_variance::*;
