//! Configuration loading tests
//!
//! Covers TOML parsing, defaults for missing sections, and the explicit
//! config path precedence (CLI argument over WDRB_CONFIG).
//!
//! Note: Tests that manipulate WDRB_CONFIG are marked with #[serial] so they
//! do not race each other.

use serial_test::serial;
use std::env;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use wdrb_common::config::{TomlConfig, CONFIG_ENV_VAR};
use wdrb_common::Error;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_full_config_parses() {
    let file = write_config(
        r#"
        authorization_url = "https://api.example.com/upload-url"
        catalog_url = "https://api.example.com/items"
        auth_token = "secret"
        user_id = "user-42"
        request_timeout_secs = 10

        [refresh]
        delay_ms = 1000
        initial_delay_ms = 250
        max_delay_ms = 4000
        multiplier = 1.5
        max_attempts = 4

        [logging]
        level = "debug"
        file = "/tmp/wardrobe.log"
        "#,
    );

    let config = TomlConfig::from_file(file.path()).unwrap();
    assert_eq!(config.user_id.as_deref(), Some("user-42"));
    assert_eq!(config.logging.level, "debug");

    let endpoints = config.endpoints().unwrap();
    assert_eq!(endpoints.authorization_url, "https://api.example.com/upload-url");
    assert_eq!(endpoints.catalog_url, "https://api.example.com/items");
    assert_eq!(endpoints.auth_token.as_deref(), Some("secret"));
    assert_eq!(endpoints.request_timeout, Duration::from_secs(10));

    let policy = config.refresh.policy().unwrap();
    assert_eq!(policy.fixed_delay, Duration::from_millis(1000));
    assert_eq!(policy.initial_delay, Duration::from_millis(250));
    assert_eq!(policy.max_attempts, 4);
}

#[test]
fn test_minimal_config_uses_defaults() {
    let file = write_config("catalog_url = \"https://api.example.com/items\"\n");

    let config = TomlConfig::from_file(file.path()).unwrap();
    assert!(config.authorization_url.is_none());
    assert!(config.user_id.is_none());
    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.file.is_none());
    assert_eq!(config.refresh.max_attempts, 6);

    // Authorization endpoint is still required before any upload
    assert!(matches!(config.endpoints(), Err(Error::Config(_))));
}

#[test]
fn test_malformed_config_is_config_error() {
    let file = write_config("authorization_url = [unterminated\n");
    let err = TomlConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
#[serial]
fn test_cli_path_takes_precedence_over_env() {
    let cli_file = write_config("user_id = \"from-cli\"\n");
    let env_file = write_config("user_id = \"from-env\"\n");

    env::set_var(CONFIG_ENV_VAR, env_file.path());
    let config = TomlConfig::load(Some(cli_file.path())).unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.user_id.as_deref(), Some("from-cli"));
}

#[test]
#[serial]
fn test_env_path_is_used_without_cli_path() {
    let env_file = write_config("user_id = \"from-env\"\n");

    env::set_var(CONFIG_ENV_VAR, env_file.path());
    let config = TomlConfig::load(None).unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.user_id.as_deref(), Some("from-env"));
}

#[test]
#[serial]
fn test_missing_explicit_config_is_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = TomlConfig::load(Some(&missing)).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
