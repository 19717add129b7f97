//! Gateway service facade.
//!
//! Each public operation issues its API call(s) through the deadline
//! orchestrator and turns the `CallOutcome` into that operation's own
//! return shape. The shapes differ on purpose:
//!
//! | operation | on failure |
//! |---|---|
//! | `ping` | `Err(FailureReason)`, `ResultsNotFound` if no `gateways` element |
//! | `gateways`, `enabled_gateway`, `add_gateway`, `redact_gateway` | `None` |
//! | `retain_payment_method` | `None` |
//! | `process_payment`, `verify_payment_method` | `Transaction` tagged `InvalidGateway` or `CallFailed` |
//! | `gateway_exists` | `false` |

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{ClientConfig, TimeoutConfig};
use crate::gateway::mapping::{gateways_from_document, transaction_from_document};
use crate::gateway::types::{is_test_gateway, to_minor_units};
use crate::gateway::{Gateway, Transaction, TransactionErrorKind};
use crate::http::{ApiRequest, ReqwestTransport, Transport, TransportError};
use crate::observability::metrics;
use crate::resilience::{call_with_deadlines, probe, CallOutcome, Deadlines, FailureReason};
use crate::security::SecurityKeys;

/// Client facade over the gateway API.
///
/// Cheap to clone; clones share credentials and transport.
#[derive(Clone)]
pub struct GatewayService {
    keys: Arc<SecurityKeys>,
    transport: Arc<dyn Transport>,
    deadlines: Deadlines,
    probe_deadline: Duration,
}

impl GatewayService {
    /// Create a service over an arbitrary transport with default deadlines.
    pub fn new(keys: SecurityKeys, transport: Arc<dyn Transport>) -> Self {
        let timeouts = TimeoutConfig::default();
        Self {
            keys: Arc::new(keys),
            transport,
            deadlines: Deadlines::from(&timeouts),
            probe_deadline: Duration::from_secs(timeouts.probe_secs),
        }
    }

    /// Create a service against the default API endpoint.
    pub fn with_credentials(
        application_id: impl Into<String>,
        master_key: impl Into<String>,
        gateway_token: impl Into<String>,
        redacted_token: impl Into<String>,
    ) -> Result<Self, TransportError> {
        let mut config = ClientConfig::default();
        config.credentials.application_id = application_id.into();
        config.credentials.master_key = master_key.into();
        config.credentials.gateway_token = gateway_token.into();
        config.credentials.redacted_token = redacted_token.into();
        Self::from_config(&config)
    }

    /// Create a `reqwest`-backed service from a loaded configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let keys = SecurityKeys::from_config(&config.credentials);
        let transport = ReqwestTransport::new(&config.api, &config.tls, keys.api_auth())?;

        tracing::info!(
            base_url = %transport.base_url(),
            application_id = %keys.application_id(),
            call_ms = config.timeouts.call_ms,
            read_ms = config.timeouts.read_ms,
            "Gateway service configured"
        );

        Ok(Self::new(keys, Arc::new(transport)).with_timeouts(&config.timeouts))
    }

    pub fn with_timeouts(mut self, timeouts: &TimeoutConfig) -> Self {
        self.deadlines = Deadlines::from(timeouts);
        self.probe_deadline = Duration::from_secs(timeouts.probe_secs);
        self
    }

    pub fn with_deadlines(mut self, deadlines: Deadlines, probe_deadline: Duration) -> Self {
        self.deadlines = deadlines;
        self.probe_deadline = probe_deadline;
        self
    }

    pub fn keys(&self) -> &SecurityKeys {
        &self.keys
    }

    /// Token of the most recently added gateway (or the initial one).
    pub fn gateway_token(&self) -> Arc<String> {
        self.keys.gateway_token()
    }

    /// First redacted gateway token, if any.
    pub fn redacted_token(&self) -> Option<String> {
        self.keys.redacted_token()
    }

    /// Check that the API answers a gateway listing.
    pub async fn ping(&self) -> Result<(), FailureReason> {
        let outcome = self.call(ApiRequest::list_gateways()).await;
        if let Some(reason) = outcome.failure_reason() {
            return Err(reason);
        }

        match outcome.document() {
            Some(document) if document.descendants("gateways").next().is_some() => Ok(()),
            _ => Err(FailureReason::ResultsNotFound),
        }
    }

    /// All gateways on the account, `None` if the listing failed.
    pub async fn gateways(&self) -> Option<Vec<Gateway>> {
        let document = self.call(ApiRequest::list_gateways()).await.into_success()?;
        Some(gateways_from_document(&document))
    }

    /// First enabled gateway of `gateway_type`, in listing order.
    pub async fn enabled_gateway(&self, gateway_type: &str) -> Option<Gateway> {
        let gateways = self.gateways().await?;
        find_enabled(gateways, gateway_type)
    }

    /// Return the enabled gateway of `gateway_type`, creating it if none
    /// exists. A newly created gateway becomes the active gateway token.
    pub async fn add_gateway(
        &self,
        gateway_type: &str,
        fields: &BTreeMap<String, String>,
    ) -> Option<Gateway> {
        // A failed listing must not lead to a duplicate gateway.
        let gateways = self.gateways().await?;
        if let Some(existing) = find_enabled(gateways, gateway_type) {
            tracing::debug!(
                gateway_type,
                token = %existing.token,
                "Enabled gateway already present"
            );
            return Some(existing);
        }

        let document = self
            .call(ApiRequest::create_gateway(gateway_type, fields))
            .await
            .into_success()?;
        let gateway = gateways_from_document(&document).into_iter().next()?;

        self.keys.set_gateway_token(gateway.token.clone());
        tracing::info!(gateway_type, token = %gateway.token, "Gateway added");
        Some(gateway)
    }

    /// Redact a gateway. `None` on any failure, including a failure status
    /// that came with a parseable body.
    pub async fn redact_gateway(&self, gateway_token: &str) -> Option<Gateway> {
        let document = self
            .call(ApiRequest::redact_gateway(gateway_token))
            .await
            .into_success()?;

        let gateway = gateways_from_document(&document).into_iter().next()?;

        self.keys.record_redacted(gateway_token);
        tracing::info!(token = %gateway_token, "Gateway redacted");
        Some(gateway)
    }

    /// Charge `amount` (major units) through the enabled gateway of
    /// `gateway_type`.
    pub async fn process_payment(
        &self,
        gateway_type: &str,
        payment_method_token: &str,
        amount: Decimal,
        currency_code: &str,
    ) -> Transaction {
        let on_test = is_test_gateway(gateway_type);
        let gateway = match self.resolve_gateway(gateway_type).await {
            Ok(gateway) => gateway,
            Err(failed) => return failed,
        };

        let Some(amount_cents) = to_minor_units(amount) else {
            tracing::warn!(%amount, "Amount cannot be charged");
            return Transaction::failed(
                on_test,
                TransactionErrorKind::CallFailed,
                format!("amount {} cannot be charged", amount),
            );
        };

        let outcome = self
            .call(ApiRequest::purchase(
                &gateway.token,
                payment_method_token,
                amount_cents,
                currency_code,
            ))
            .await;
        transaction_or_call_failed(outcome, on_test)
    }

    /// Verify a payment method against the enabled gateway of
    /// `gateway_type`.
    pub async fn verify_payment_method(
        &self,
        gateway_type: &str,
        payment_method_token: &str,
    ) -> Transaction {
        let on_test = is_test_gateway(gateway_type);
        let gateway = match self.resolve_gateway(gateway_type).await {
            Ok(gateway) => gateway,
            Err(failed) => return failed,
        };

        let outcome = self
            .call(ApiRequest::verify_payment_method(
                &gateway.token,
                payment_method_token,
            ))
            .await;
        transaction_or_call_failed(outcome, on_test)
    }

    /// Retain a payment method. `None` on any failure.
    pub async fn retain_payment_method(&self, payment_method_token: &str) -> Option<Transaction> {
        let document = self
            .call(ApiRequest::retain_payment_method(payment_method_token))
            .await
            .into_success()?;
        transaction_from_document(&document)
    }

    /// Short-form existence check for a gateway token.
    pub async fn gateway_exists(&self, gateway_token: &str) -> bool {
        let request = ApiRequest::show_gateway(gateway_token);
        let started = Instant::now();

        let exists = probe(self.probe_deadline, |cancel| {
            self.transport.send(request, cancel)
        })
        .await;

        metrics::record_probe(exists, started.elapsed());
        tracing::debug!(token = %gateway_token, exists, "Gateway probe finished");
        exists
    }

    /// The enabled gateway for a payment, or the transaction to return
    /// instead. A failed listing is a failed call, not an invalid gateway.
    async fn resolve_gateway(&self, gateway_type: &str) -> Result<Gateway, Transaction> {
        let on_test = is_test_gateway(gateway_type);

        let Some(gateways) = self.gateways().await else {
            return Err(Transaction::failed(
                on_test,
                TransactionErrorKind::CallFailed,
                "gateway listing failed",
            ));
        };

        find_enabled(gateways, gateway_type).ok_or_else(|| {
            tracing::warn!(gateway_type, "No enabled gateway for payment");
            Transaction::failed(on_test, TransactionErrorKind::InvalidGateway, "")
        })
    }

    /// Run one API call under the configured deadlines, with logging and
    /// metrics around it.
    async fn call(&self, request: ApiRequest) -> CallOutcome {
        let operation = request.operation;
        let span = tracing::info_span!(
            "gateway_call",
            call_id = %Uuid::new_v4(),
            operation = operation.as_str()
        );

        async move {
            let started = Instant::now();
            let outcome = call_with_deadlines(self.deadlines, |cancel| {
                self.transport.send(request, cancel)
            })
            .await;
            let elapsed = started.elapsed();

            metrics::record_call(operation, outcome.failure_reason(), elapsed);
            log_outcome(&outcome, elapsed);
            outcome
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for GatewayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayService")
            .field("keys", &self.keys)
            .field("deadlines", &self.deadlines)
            .field("probe_deadline", &self.probe_deadline)
            .finish_non_exhaustive()
    }
}

fn find_enabled(gateways: Vec<Gateway>, gateway_type: &str) -> Option<Gateway> {
    gateways
        .into_iter()
        .find(|gateway| gateway.gateway_type == gateway_type && gateway.enabled)
}

fn transaction_or_call_failed(outcome: CallOutcome, on_test: bool) -> Transaction {
    if let CallOutcome::Success(document) = &outcome {
        if let Some(transaction) = transaction_from_document(document) {
            return transaction;
        }
    }

    let reason = outcome
        .failure_reason()
        .map_or_else(|| "response did not contain a transaction".to_string(), |r| r.to_string());
    let mut failed = Transaction::failed(on_test, TransactionErrorKind::CallFailed, reason);

    // Keep whatever the gateway reported alongside the CallFailed tag.
    if let CallOutcome::HttpFailure { document, .. } = &outcome {
        if let Some(reported) = transaction_from_document(document) {
            failed.message = reported.message;
            failed.errors.extend(reported.errors);
        }
    }
    failed
}

fn log_outcome(outcome: &CallOutcome, elapsed: Duration) {
    let elapsed_ms = elapsed.as_millis() as u64;
    match outcome {
        CallOutcome::Success(_) => tracing::debug!(elapsed_ms, "Call succeeded"),
        CallOutcome::HttpFailure { status, .. } => {
            tracing::warn!(elapsed_ms, status = status.as_u16(), "Call returned failure status")
        }
        CallOutcome::Timeout(phase) => {
            tracing::warn!(elapsed_ms, %phase, "Call timed out, cancelled")
        }
        CallOutcome::ConnectionFailure(error) => {
            tracing::warn!(elapsed_ms, error = %error, "Call failed to connect")
        }
        CallOutcome::MalformedResponse { status, error } => tracing::warn!(
            elapsed_ms,
            status = status.as_u16(),
            line = error.line,
            error = %error.message,
            "Call returned malformed body"
        ),
    }
}
