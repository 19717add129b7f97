//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variables that override credential fields.
pub const ENV_APPLICATION_ID: &str = "SPREEDLY_APPLICATION_ID";
pub const ENV_MASTER_KEY: &str = "SPREEDLY_MASTER_KEY";
pub const ENV_GATEWAY_TOKEN: &str = "SPREEDLY_GATEWAY_TOKEN";
pub const ENV_BASE_URL: &str = "SPREEDLY_BASE_URL";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load a TOML file, apply environment overrides, and validate.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: ClientConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build a configuration from defaults plus environment only.
pub fn config_from_env() -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();
    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

pub fn apply_env_overrides(config: &mut ClientConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Overwrite credential and endpoint fields with any non-empty values
/// returned by `lookup`.
pub fn apply_overrides<F>(config: &mut ClientConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(value) = get(ENV_APPLICATION_ID) {
        config.credentials.application_id = value;
    }
    if let Some(value) = get(ENV_MASTER_KEY) {
        config.credentials.master_key = value;
    }
    if let Some(value) = get(ENV_GATEWAY_TOKEN) {
        config.credentials.gateway_token = value;
    }
    if let Some(value) = get(ENV_BASE_URL) {
        config.api.base_url = value;
    }
}
