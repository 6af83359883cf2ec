//! Monitor settings
//!
//! Layered: built-in defaults, then an optional TOML file, then
//! `DROWSY__`-prefixed environment variables, e.g.
//! `DROWSY__DETECTION__EAR_THRESHOLD=0.25`.

use alerting::AlertConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use dms::{DmsConfig, DrowsinessDetector};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::Level;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "DROWSY";

/// Settings errors
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Max level (trace, debug, info, warn, error)
    pub level: String,
    /// Emit JSON log lines
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LogSettings {
    pub fn level(&self) -> Result<Level, SettingsError> {
        self.level
            .parse()
            .map_err(|_| SettingsError::Invalid(format!("unknown log level `{}`", self.level)))
    }
}

/// Complete monitor settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub detection: DmsConfig,
    pub alert: AlertConfig,
    pub logging: LogSettings,
}

impl Settings {
    /// Load defaults, the optional settings file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(" ")
                .with_list_parse_key("alert.command")
                .try_parsing(true),
        );

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the detector or logger cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        DrowsinessDetector::from_config(&self.detection)
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;
        self.logging.level()?;

        if matches!(&self.alert.command, Some(command) if command.is_empty()) {
            return Err(SettingsError::Invalid("alert command is empty".into()));
        }
        Ok(())
    }
}
