//! Provider settings resolution for naturelens-id
//!
//! Turns the loaded TOML configuration into the settings the provider
//! adapters are built from. API keys resolve with ENV → TOML priority.

use naturelens_common::config::{Endpoints, Timeouts, TomlConfig};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variables holding provider API keys
pub const VISION_API_KEY_ENV: &str = "NATURELENS_VISION_API_KEY";
pub const PLANTNET_API_KEY_ENV: &str = "NATURELENS_PLANTNET_API_KEY";
pub const ANIMAL_API_KEY_ENV: &str = "NATURELENS_ANIMAL_API_KEY";

/// Resolve one provider API key
///
/// **Priority:** ENV → TOML
///
/// Returns `None` when neither source holds a valid key. The provider then
/// reports an upstream error per request instead of blocking startup.
pub fn resolve_api_key(provider: &str, env_var: &str, toml_key: Option<&str>) -> Option<String> {
    let env_key = std::env::var(env_var).ok().filter(|key| is_valid_key(key));
    let toml_key = toml_key.filter(|key| is_valid_key(key));

    // Warn if multiple sources (potential misconfiguration)
    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "{} API key found in multiple sources: environment, TOML. Using environment (highest priority).",
            provider
        );
    }

    if let Some(key) = env_key {
        info!("{} API key loaded from environment variable", provider);
        return Some(key);
    }

    if let Some(key) = toml_key {
        info!("{} API key loaded from TOML config", provider);
        return Some(key.to_string());
    }

    warn!(
        "{} API key not configured. Set {} or add it under [api_keys] in the TOML config",
        provider, env_var
    );
    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Clamped per-provider timeouts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderTimeouts {
    pub vision: Duration,
    pub plantnet: Duration,
    pub zoologist: Duration,
    pub animal: Duration,
    pub wikipedia: Duration,
}

impl From<&Timeouts> for ProviderTimeouts {
    fn from(timeouts: &Timeouts) -> Self {
        Self {
            vision: Timeouts::duration(timeouts.vision),
            plantnet: Timeouts::duration(timeouts.plantnet),
            zoologist: Timeouts::duration(timeouts.zoologist),
            animal: Timeouts::duration(timeouts.animal),
            wikipedia: Timeouts::duration(timeouts.wikipedia),
        }
    }
}

/// Everything needed to build the provider adapters
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub vision_api_key: Option<String>,
    pub plantnet_api_key: Option<String>,
    pub animal_api_key: Option<String>,
    pub endpoints: Endpoints,
    pub timeouts: ProviderTimeouts,
    pub fauna_min_confidence: f64,
}

impl ProviderSettings {
    pub fn from_toml(config: &TomlConfig) -> Self {
        let keys = &config.api_keys;
        Self {
            vision_api_key: resolve_api_key(
                "Google Vision",
                VISION_API_KEY_ENV,
                keys.vision.as_deref(),
            ),
            plantnet_api_key: resolve_api_key(
                "Pl@ntNet",
                PLANTNET_API_KEY_ENV,
                keys.plantnet.as_deref(),
            ),
            animal_api_key: resolve_api_key(
                "API Ninjas",
                ANIMAL_API_KEY_ENV,
                keys.animal.as_deref(),
            ),
            endpoints: config.endpoints.clone(),
            timeouts: ProviderTimeouts::from(&config.timeouts),
            fauna_min_confidence: config.thresholds.fauna_min_confidence,
        }
    }
}
