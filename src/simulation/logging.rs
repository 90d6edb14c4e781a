//! Logging and tracing configuration
//!
//! This module provides centralized logging configuration for the simulator:
//! the process-wide console subscriber, and the per-scenario event log that is
//! installed as a scoped dispatcher while that scenario runs.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, Dispatch, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for console output
    pub level: Level,
    /// Log level for the per-scenario event log
    pub event_log_level: Level,
    /// Whether to enable JSON formatting
    pub json_format: bool,
    /// Whether to log to file
    pub log_to_file: bool,
    /// Log file directory (if logging to file)
    pub log_directory: Option<String>,
    /// Log file prefix (if logging to file)
    pub log_file_prefix: String,
    /// Whether to enable span events
    pub enable_span_events: bool,
    /// Whether to enable ansi colors in console output
    pub enable_ansi: bool,
    /// Custom environment filter
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            event_log_level: Level::DEBUG,
            json_format: false,
            log_to_file: false,
            log_directory: None,
            log_file_prefix: "call-center-sim".to_string(),
            enable_span_events: false,
            enable_ansi: true,
            env_filter: None,
        }
    }
}

/// Name of the event log written into a scenario's run directory
pub fn event_log_file_name(seed: u64) -> String {
    format!("eventLog_{}.log", seed)
}

/// Event log of one scenario run
///
/// Holds the dispatcher and the writer guard; dropping it flushes the file.
#[derive(Debug)]
pub struct RunLog {
    dispatch: Dispatch,
    _guard: WorkerGuard,
}

impl RunLog {
    /// Run `f` with this log as the current dispatcher
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the console log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the event log level
    pub fn with_event_log_level(mut self, level: Level) -> Self {
        self.event_log_level = level;
        self
    }

    /// Enable JSON formatting
    pub fn with_json_format(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Enable file logging
    pub fn with_file_logging(mut self, directory: impl Into<String>) -> Self {
        self.log_to_file = true;
        self.log_directory = Some(directory.into());
        self
    }

    /// Set log file prefix
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_file_prefix = prefix.into();
        self
    }

    /// Enable span events
    pub fn with_span_events(mut self) -> Self {
        self.enable_span_events = true;
        self
    }

    /// Disable ANSI colors
    pub fn without_ansi(mut self) -> Self {
        self.enable_ansi = false;
        self
    }

    /// Set custom environment filter
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn span_events(&self) -> FmtSpan {
        if self.enable_span_events {
            FmtSpan::FULL
        } else {
            FmtSpan::NONE
        }
    }

    fn crate_filter(&self, level: Level) -> EnvFilter {
        EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), level))
    }

    fn console_filter(&self) -> Result<EnvFilter, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match &self.env_filter {
            Some(filter) => EnvFilter::try_new(filter)?,
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| self.crate_filter(self.level)),
        })
    }

    /// Initialize the global tracing subscriber
    pub fn init(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let registry = Registry::default().with(self.console_filter()?);

        if self.log_to_file {
            let log_dir = self.log_directory.as_deref().unwrap_or("logs");
            let file_appender = rolling::daily(log_dir, &self.log_file_prefix);
            let (file_writer, guard) = non_blocking(file_appender);
            let file_layer =
                fmt::layer().json().with_writer(file_writer).with_span_events(self.span_events());

            if self.json_format {
                let console_layer = fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_span_events(self.span_events());
                registry.with(file_layer).with(console_layer).init();
            } else {
                let console_layer = fmt::layer()
                    .with_writer(io::stderr)
                    .with_ansi(self.enable_ansi)
                    .with_span_events(self.span_events());
                registry.with(file_layer).with(console_layer).init();
            }

            // The global subscriber lives for the whole process
            std::mem::forget(guard);
        } else if self.json_format {
            let layer =
                fmt::layer().json().with_writer(io::stderr).with_span_events(self.span_events());
            registry.with(layer).init();
        } else {
            let layer = fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(self.enable_ansi)
                .with_span_events(self.span_events());
            registry.with(layer).init();
        }

        info!("Logging initialized successfully");
        Ok(())
    }

    /// Build the event log for a scenario run writing `eventLog_<seed>.log` into `dir`
    ///
    /// The returned log also echoes to the console at the console level.
    pub fn run_log<P: AsRef<Path>>(
        &self,
        dir: P,
        seed: u64,
    ) -> Result<RunLog, Box<dyn std::error::Error + Send + Sync>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let (file_writer, guard) = non_blocking(rolling::never(dir, event_log_file_name(seed)));

        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_target(true)
            .with_span_events(self.span_events())
            .with_filter(self.crate_filter(self.event_log_level));
        let console_layer = fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(self.enable_ansi)
            .with_filter(self.console_filter()?);

        let subscriber = Registry::default().with(file_layer).with(console_layer);
        Ok(RunLog { dispatch: Dispatch::new(subscriber), _guard: guard })
    }

    /// Initialize logging for the command line (level from verbosity flags)
    pub fn for_cli(verbose: bool, debug: bool) -> Self {
        let level = if debug {
            Level::DEBUG
        } else if verbose {
            Level::INFO
        } else {
            Level::WARN
        };
        Self::new().with_level(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_logging_config_creation() {
        let config = LoggingConfig::new();
        assert_eq!(config.level, Level::WARN);
        assert_eq!(config.event_log_level, Level::DEBUG);
        assert!(!config.json_format);
        assert!(!config.log_to_file);
        assert!(config.log_directory.is_none());
        assert_eq!(config.log_file_prefix, "call-center-sim");
        assert!(!config.enable_span_events);
        assert!(config.enable_ansi);
        assert!(config.env_filter.is_none());
    }

    #[test]
    fn test_logging_config_builder_pattern() {
        let config = LoggingConfig::new()
            .with_level(Level::DEBUG)
            .with_event_log_level(Level::INFO)
            .with_json_format()
            .with_file_logging("test_logs")
            .with_file_prefix("test_prefix")
            .with_span_events()
            .without_ansi()
            .with_env_filter("debug");

        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.event_log_level, Level::INFO);
        assert!(config.json_format);
        assert!(config.log_to_file);
        assert_eq!(config.log_directory, Some("test_logs".to_string()));
        assert_eq!(config.log_file_prefix, "test_prefix");
        assert!(config.enable_span_events);
        assert!(!config.enable_ansi);
        assert_eq!(config.env_filter, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_verbosity_levels() {
        assert_eq!(LoggingConfig::for_cli(false, false).level, Level::WARN);
        assert_eq!(LoggingConfig::for_cli(true, false).level, Level::INFO);
        assert_eq!(LoggingConfig::for_cli(true, true).level, Level::DEBUG);
    }

    #[test]
    fn test_run_log_writes_event_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig::new().without_ansi().with_env_filter("off");
        {
            let log = config.run_log(dir.path(), 42).unwrap();
            log.in_scope(|| tracing::info!("Customer registered to service"));
        }
        let content = fs::read_to_string(dir.path().join(event_log_file_name(42))).unwrap();
        assert!(content.contains("Customer registered to service"));
    }
}
