//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (deadlines > 0)
//! - Check that the base URL and credentials are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Missing { field: &'static str },

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("invalid base_url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported log_format '{0}' (expected pretty or compact)")]
    LogFormat(String),
}

pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.api.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::InvalidUrl {
            url: config.api.base_url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidUrl {
            url: config.api.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.credentials.application_id.trim().is_empty() {
        errors.push(ValidationError::Missing {
            field: "credentials.application_id",
        });
    }
    if config.credentials.master_key.trim().is_empty() {
        errors.push(ValidationError::Missing {
            field: "credentials.master_key",
        });
    }

    if config.timeouts.call_ms == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "timeouts.call_ms",
        });
    }
    if config.timeouts.read_ms == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "timeouts.read_ms",
        });
    }
    if config.timeouts.probe_secs == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "timeouts.probe_secs",
        });
    }

    match config.observability.log_format.as_str() {
        "pretty" | "compact" => {}
        other => errors.push(ValidationError::LogFormat(other.to_string())),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
