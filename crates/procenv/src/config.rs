//! Configuration loading and validation for procenv

use crate::lifecycle::DEFAULT_ABORT_EXIT_CODE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl From<ConfigError> for common::Error {
    fn from(err: ConfigError) -> Self {
        common::Error::config(err)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub lifecycle: LifecycleSettings,

    #[serde(default)]
    pub launcher: LauncherSettings,

    #[serde(default)]
    pub checks: CheckSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        self.lifecycle.validate()?;
        self.launcher.validate()?;
        self.checks.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Lifecycle settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LifecycleSettings {
    /// Process exit code when a preboot check fails
    #[validate(range(min = 1, max = 255))]
    pub abort_exit_code: i32,
}

/// How the application is started
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LauncherSettings {
    #[validate(length(min = 1), custom = "validate_program")]
    pub program: String,

    /// Arguments appended after `-f <procfile>`
    pub args: Vec<String>,
}

/// Settings shared by the catalog checks
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CheckSettings {
    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_check_interval")]
    pub interval: Duration,
}

/// Log output formats understood by `logging.format`
pub const LOG_FORMATS: [&str; 2] = ["text", "json"];

/// Logging settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoggingSettings {
    pub level: Option<String>,

    #[validate(custom = "validate_log_format")]
    pub format: Option<String>,
}

impl LoggingSettings {
    /// Install the tracing subscriber described by these settings
    pub fn init(&self) {
        let level = self.level.as_deref().unwrap_or(common::logging::DEFAULT_LEVEL);
        match self.format.as_deref() {
            Some("json") => common::logging::init_json(level),
            _ => common::logging::init(level),
        }
    }
}

// Default implementations

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            abort_exit_code: DEFAULT_ABORT_EXIT_CODE,
        }
    }
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            program: "honcho".to_string(),
            args: vec!["start".to_string()],
        }
    }
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            interval: checks::context::DEFAULT_INTERVAL,
        }
    }
}

// Custom validators

fn validate_program(program: &str) -> Result<(), ValidationError> {
    if program.trim().is_empty() {
        return Err(ValidationError::new("program_empty"));
    }
    Ok(())
}

fn validate_log_format(format: &str) -> Result<(), ValidationError> {
    if !LOG_FORMATS.contains(&format) {
        return Err(ValidationError::new("log_format_unknown"));
    }
    Ok(())
}

fn validate_check_interval(interval: &Duration) -> Result<(), ValidationError> {
    let millis = interval.as_millis();
    if millis < 10 || millis > 3_600_000 {
        return Err(ValidationError::new("check_interval_out_of_range"));
    }
    Ok(())
}

// Configuration loading implementation

impl Config {
    /// Load configuration from `explicit` if given, otherwise from the
    /// default search paths. No file at all means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }

        match Self::find_config_file() {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(&path)
            }
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration text
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        // An empty document means all defaults
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/procenv/procenv.yaml")];

        if let Some(home_path) = Self::home_config_path() {
            paths.push(home_path);
        }

        paths.push(PathBuf::from("./procenv.yaml"));

        paths.into_iter().find(|p| p.is_file())
    }

    fn home_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/procenv/procenv.yaml"))
    }
}
