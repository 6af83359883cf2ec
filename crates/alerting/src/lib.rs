//! Alerting System
//!
//! Keeps an output sink in step with the drowsiness alert (log warning,
//! external sound player) and keeps per-episode bookkeeping.

mod manager;
mod sink;

pub use manager::{AlertConfig, AlertManager, AlertState};
pub use sink::{AlertSink, CommandSink, LogSink, RecordingSink, SinkEvent};

use thiserror::Error;

/// Alert output errors
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Failed to start alert command `{program}`: {reason}")]
    Spawn { program: String, reason: String },

    #[error("Failed to stop alert command: {0}")]
    Stop(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Build the sink described by the configuration
pub fn sink_from_config(config: &AlertConfig) -> Result<Box<dyn AlertSink + Send>, AlertError> {
    match &config.command {
        Some(command) => Ok(Box::new(CommandSink::new(command)?)),
        None => Ok(Box::new(LogSink::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_logs_only() {
        let sink = sink_from_config(&AlertConfig::default()).unwrap();
        assert!(!sink.is_active());
    }

    #[test]
    fn test_empty_command_rejected() {
        let config = AlertConfig {
            command: Some(Vec::new()),
        };
        assert!(sink_from_config(&config).is_err());
    }
}
