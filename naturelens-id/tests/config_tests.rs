//! API key resolution tests
//!
//! These tests mutate process environment variables, so they run serially.

use naturelens_common::config::TomlConfig;
use naturelens_id::config::{
    resolve_api_key, ProviderSettings, ANIMAL_API_KEY_ENV, PLANTNET_API_KEY_ENV,
    VISION_API_KEY_ENV,
};
use serial_test::serial;
use std::env;
use std::time::Duration;

fn clear_key_env() {
    env::remove_var(VISION_API_KEY_ENV);
    env::remove_var(PLANTNET_API_KEY_ENV);
    env::remove_var(ANIMAL_API_KEY_ENV);
}

#[test]
#[serial]
fn test_env_key_takes_priority_over_toml() {
    clear_key_env();
    env::set_var(VISION_API_KEY_ENV, "env-key");

    let key = resolve_api_key("Google Vision", VISION_API_KEY_ENV, Some("toml-key"));

    assert_eq!(key.as_deref(), Some("env-key"));
    clear_key_env();
}

#[test]
#[serial]
fn test_toml_key_used_without_env() {
    clear_key_env();

    let key = resolve_api_key("Pl@ntNet", PLANTNET_API_KEY_ENV, Some("toml-key"));

    assert_eq!(key.as_deref(), Some("toml-key"));
}

#[test]
#[serial]
fn test_blank_keys_are_ignored() {
    clear_key_env();
    env::set_var(ANIMAL_API_KEY_ENV, "   ");

    assert_eq!(
        resolve_api_key("API Ninjas", ANIMAL_API_KEY_ENV, Some("toml-key")).as_deref(),
        Some("toml-key")
    );
    assert!(resolve_api_key("API Ninjas", ANIMAL_API_KEY_ENV, Some("")).is_none());
    assert!(resolve_api_key("API Ninjas", ANIMAL_API_KEY_ENV, None).is_none());
    clear_key_env();
}

#[test]
#[serial]
fn test_provider_settings_from_toml() {
    clear_key_env();
    env::set_var(PLANTNET_API_KEY_ENV, "plant-env");

    let config: TomlConfig = toml::from_str(
        r#"
        [api_keys]
        vision = "vision-toml"

        [endpoints]
        wikipedia = "http://localhost:9000/summary"

        [timeouts]
        animal = 0
        zoologist = 120

        [thresholds]
        fauna_min_confidence = 0.8
        "#,
    )
    .unwrap();

    let settings = ProviderSettings::from_toml(&config);

    assert_eq!(settings.vision_api_key.as_deref(), Some("vision-toml"));
    assert_eq!(settings.plantnet_api_key.as_deref(), Some("plant-env"));
    assert!(settings.animal_api_key.is_none());
    assert_eq!(settings.endpoints.wikipedia, "http://localhost:9000/summary");
    assert_eq!(settings.timeouts.animal, Duration::from_secs(1));
    assert_eq!(settings.timeouts.zoologist, Duration::from_secs(30));
    assert_eq!(settings.timeouts.vision, Duration::from_secs(10));
    assert_eq!(settings.fauna_min_confidence, 0.8);
    clear_key_env();
}
