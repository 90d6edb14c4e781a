//! Error types and handling
//!
//! This module contains error types for the plumbing around a simulation run.
//! Business failures inside the model (rejected customers, escalations) are not
//! errors; they are counted in [`crate::simulation::RunStatistics`].

use crate::types::{ConfigError, ConfigValidationError};
use thiserror::Error;

/// Errors that can occur while preparing, running or exporting a simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ConfigurationError(String),

    /// A scenario file could not be loaded
    #[error("Scenario loading failed: {0}")]
    ScenarioError(String),

    /// The run was already driven to its horizon
    #[error("Simulation already finished at t={0}")]
    AlreadyFinished(f64),

    /// Statistics export failed
    #[error("Export failed: {0}")]
    ExportError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<ConfigValidationError> for SimulationError {
    fn from(error: ConfigValidationError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl From<ConfigError> for SimulationError {
    fn from(error: ConfigError) -> Self {
        SimulationError::ScenarioError(error.to_string())
    }
}

impl SimulationError {
    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a scenario loading error
    pub fn scenario_error(msg: impl Into<String>) -> Self {
        Self::ScenarioError(msg.into())
    }

    /// Create an export error
    pub fn export_error(msg: impl Into<String>) -> Self {
        Self::ExportError(msg.into())
    }

    /// Check if the scenario loop may move on to the next scenario
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimulationError::ConfigurationError(_) => true,
            SimulationError::ScenarioError(_) => true,
            SimulationError::AlreadyFinished(_) => false,
            SimulationError::ExportError(_) => true,
            SimulationError::IoError(_) => false,
            SimulationError::SerializationError(_) => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::ConfigurationError(_) => "Configuration",
            SimulationError::ScenarioError(_) => "Scenario",
            SimulationError::AlreadyFinished(_) => "Run State",
            SimulationError::ExportError(_) => "Export",
            SimulationError::IoError(_) => "IO",
            SimulationError::SerializationError(_) => "Serialization",
        }
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;
