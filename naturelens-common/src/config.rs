//! Configuration loading and config file resolution
//!
//! Config file location priority:
//! 1. Command-line argument (highest priority)
//! 2. `NATURELENS_CONFIG` environment variable
//! 3. OS config directory: `<config_dir>/naturelens/naturelens.toml`
//!
//! A missing config file is not an error: every field has a compiled default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "NATURELENS_CONFIG";

/// Default listen address for the identification service
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5780";

/// Per-call timeouts are clamped to this range (seconds)
pub const MIN_TIMEOUT_SECS: u64 = 1;
pub const MAX_TIMEOUT_SECS: u64 = 30;

/// Root TOML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub bind_address: String,
    pub logging: LoggingConfig,
    pub api_keys: ApiKeys,
    pub endpoints: Endpoints,
    pub timeouts: Timeouts,
    pub thresholds: Thresholds,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            logging: LoggingConfig::default(),
            api_keys: ApiKeys::default(),
            endpoints: Endpoints::default(),
            timeouts: Timeouts::default(),
            thresholds: Thresholds::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing level when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Provider API keys as written in the TOML file
///
/// Environment variables take precedence; see the service crate's
/// key resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiKeys {
    pub vision: Option<String>,
    pub plantnet: Option<String>,
    pub animal: Option<String>,
}

/// Upstream base URLs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Endpoints {
    pub vision: String,
    pub plantnet: String,
    pub zoologist: String,
    pub animal: String,
    pub wikipedia: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            vision: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            plantnet: "https://my-api.plantnet.org/v2/identify/all".to_string(),
            zoologist: "https://text.pollinations.ai/".to_string(),
            animal: "https://api.api-ninjas.com/v1/animals".to_string(),
            wikipedia: "https://en.wikipedia.org/api/rest_v1/page/summary".to_string(),
        }
    }
}

/// Per-provider request timeouts in seconds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Timeouts {
    pub vision: u64,
    pub plantnet: u64,
    pub zoologist: u64,
    pub animal: u64,
    pub wikipedia: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            vision: 10,
            plantnet: 10,
            zoologist: 10,
            animal: 5,
            wikipedia: 5,
        }
    }
}

impl Timeouts {
    /// Clamp a configured value into the supported range
    pub fn duration(secs: u64) -> Duration {
        Duration::from_secs(secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum labeler confidence to accept a fauna candidate
    pub fauna_min_confidence: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            fauna_min_confidence: 0.7,
        }
    }
}

impl TomlConfig {
    /// Reject values that would make the service misbehave
    pub fn validate(&self) -> Result<()> {
        let threshold = self.thresholds.fauna_min_confidence;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::Config(format!(
                "thresholds.fauna_min_confidence must be within 0.0-1.0, got {}",
                threshold
            )));
        }
        if self.bind_address.trim().is_empty() {
            return Err(Error::Config("bind_address cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Resolve which config file to read
///
/// Returns `None` when no candidate can be determined (no CLI argument, no
/// environment variable, and no platform config directory).
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: OS config directory
    default_config_path()
}

/// `<config_dir>/naturelens/naturelens.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("naturelens").join("naturelens.toml"))
}

/// Load configuration from `path`
///
/// A missing file logs a warning and yields defaults. An unreadable or
/// malformed file is an error.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        warn!("No config file location available, using defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!("Config file not found at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    config.validate()?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}
