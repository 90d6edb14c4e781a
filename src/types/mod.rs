//! Core types and identifiers for the call center simulator
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the simulation system.
//!
//! # Overview
//!
//! - **Identifiers**: customer and process identities used to tag log output
//! - **Enums**: tracked activities, support-flow path variants, call outcomes
//! - **Configuration**: call center parameters, scenarios, CLI and validation
//!
//! # Usage Example
//!
//! ```rust
//! use call_center_sim::types::*;
//!
//! let scenario = Scenario {
//!     name: "baseline".to_string(),
//!     random_seed: Some(7),
//!     ..Default::default()
//! };
//! let config = SimulationConfig::for_scenario(scenario);
//! assert!(config.validate().is_ok());
//!
//! let customer = ProcessId::Customer(CustomerId::new(1));
//! assert_eq!(customer.to_string(), "1");
//! assert_eq!(Activity::IsProblemSolved.as_str(), "is_problem_solved");
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
