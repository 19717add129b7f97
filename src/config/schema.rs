//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// API endpoint settings.
    pub api: ApiConfig,

    /// Identity and gateway tokens.
    pub credentials: CredentialsConfig,

    /// Call and read deadlines.
    pub timeouts: TimeoutConfig,

    /// TLS settings.
    pub tls: TlsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Gateway API endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL; request paths such as `v1/gateways.xml` are joined onto it.
    pub base_url: String,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://core.spreedly.com".to_string(),
            user_agent: concat!("spreedly-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Credentials handed to the service at construction.
///
/// Secrets may be left empty here and supplied through the environment
/// (see `loader.rs`).
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Application (environment) identifier, the basic-auth user.
    pub application_id: String,

    /// Master key (access secret), the basic-auth password.
    pub master_key: String,

    /// Initially active gateway token.
    pub gateway_token: String,

    /// Previously redacted gateway token, if any.
    pub redacted_token: String,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("application_id", &self.application_id)
            .field("master_key", &"<redacted>")
            .field("gateway_token", &self.gateway_token)
            .field("redacted_token", &self.redacted_token)
            .finish()
    }
}

/// Timeout configuration for gateway calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request/response exchange deadline in milliseconds.
    pub call_ms: u64,

    /// Body read deadline in milliseconds, counted after the exchange.
    pub read_ms: u64,

    /// Deadline for existence probes in seconds.
    pub probe_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            call_ms: 5_000,
            read_ms: 250,
            probe_secs: 30,
        }
    }
}

/// TLS configuration for outbound calls.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TlsConfig {
    /// Skip certificate validation. Test environments only.
    pub accept_invalid_certs: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format: "pretty" or "compact".
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}
