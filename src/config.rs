use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::pipeline::processing::DuplicatePolicy;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_PATH: &str = "join.toml";

pub const ENV_USERS: &str = "JOIN_USERS";
pub const ENV_EVENTS: &str = "JOIN_EVENTS";
pub const ENV_OUTPUT_DIR: &str = "JOIN_OUTPUT_DIR";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub duplicates: DuplicatePolicy,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    pub users: PathBuf,
    pub events: PathBuf,
    pub delimiter: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            users: PathBuf::from("users.csv"),
            events: PathBuf::from("events.csv"),
            delimiter: ',',
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, `RUST_LOG` takes precedence
    pub level: String,
    /// Directory for the rolling JSON log; no file logging when unset
    pub dir: Option<PathBuf>,
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            file_name: "user_event_join.log".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus text snapshot written after the run
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load from an explicit path, or from `join.toml` if present, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let content = fs::read_to_string(&config_path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.delimiter()?;
        Ok(config)
    }

    /// Override input and output locations from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(users) = non_empty(ENV_USERS) {
            self.input.users = PathBuf::from(users);
        }
        if let Some(events) = non_empty(ENV_EVENTS) {
            self.input.events = PathBuf::from(events);
        }
        if let Some(dir) = non_empty(ENV_OUTPUT_DIR) {
            self.output.dir = PathBuf::from(dir);
        }
    }

    /// Delimiter as the single byte the CSV reader and writer expect
    pub fn delimiter(&self) -> Result<u8> {
        let c = self.input.delimiter;
        if c.is_ascii() {
            Ok(c as u8)
        } else {
            Err(PipelineError::Config(format!(
                "Delimiter must be a single ASCII character, got '{c}'"
            )))
        }
    }
}
