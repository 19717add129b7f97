//! Credential storage for the gateway service.
//!
//! # Responsibilities
//! - Hold the immutable API identity (application id, master key)
//! - Track the active gateway token
//! - Track redacted gateway tokens in the order they were recorded
//!
//! # Design Decisions
//! - Mutable fields live behind `ArcSwap`, so readers never block and
//!   concurrent writers replace whole values instead of mutating in place
//! - Nothing is persisted; state lives as long as the owning service

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::CredentialsConfig;
use crate::http::ApiAuth;

pub struct SecurityKeys {
    application_id: String,
    master_key: String,
    gateway_token: ArcSwap<String>,
    redacted_tokens: ArcSwap<Vec<String>>,
}

impl SecurityKeys {
    /// Empty `redacted_token` means no token has been redacted yet.
    pub fn new(
        application_id: impl Into<String>,
        master_key: impl Into<String>,
        gateway_token: impl Into<String>,
        redacted_token: impl Into<String>,
    ) -> Self {
        let redacted_token = redacted_token.into();
        let redacted = if redacted_token.is_empty() {
            Vec::new()
        } else {
            vec![redacted_token]
        };

        Self {
            application_id: application_id.into(),
            master_key: master_key.into(),
            gateway_token: ArcSwap::from_pointee(gateway_token.into()),
            redacted_tokens: ArcSwap::from_pointee(redacted),
        }
    }

    pub fn from_config(config: &CredentialsConfig) -> Self {
        Self::new(
            config.application_id.clone(),
            config.master_key.clone(),
            config.gateway_token.clone(),
            config.redacted_token.clone(),
        )
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Basic-auth pair for the transport.
    pub fn api_auth(&self) -> ApiAuth {
        ApiAuth {
            application_id: self.application_id.clone(),
            master_key: self.master_key.clone(),
        }
    }

    /// Currently active gateway token.
    pub fn gateway_token(&self) -> Arc<String> {
        self.gateway_token.load_full()
    }

    /// Make `token` the active gateway token.
    pub fn set_gateway_token(&self, token: impl Into<String>) {
        self.gateway_token.store(Arc::new(token.into()));
    }

    /// First redacted token recorded, if any.
    pub fn redacted_token(&self) -> Option<String> {
        self.redacted_tokens.load().first().cloned()
    }

    pub fn redacted_tokens(&self) -> Vec<String> {
        self.redacted_tokens.load().as_ref().clone()
    }

    /// Record a redacted token. Already-known tokens are not duplicated.
    pub fn record_redacted(&self, token: &str) {
        self.redacted_tokens.rcu(|current| {
            let mut next = current.as_ref().clone();
            if !next.iter().any(|known| known == token) {
                next.push(token.to_string());
            }
            next
        });
    }
}

impl std::fmt::Debug for SecurityKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityKeys")
            .field("application_id", &self.application_id)
            .field("master_key", &"<redacted>")
            .field("gateway_token", &self.gateway_token.load())
            .field("redacted_tokens", &self.redacted_tokens.load())
            .finish()
    }
}
