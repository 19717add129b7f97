//! Deadline enforcement for gateway calls.
//!
//! # Responsibilities
//! - Run exactly one call to completion or cancellation
//! - Bound the exchange (status + headers) and the body read separately
//! - Cancel the in-flight call when a deadline elapses
//! - Fold every ending into a `CallOutcome`
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Cancellation is cooperative via `CancellationToken`; the deadline
//!   outcome is returned immediately whether or not the transport honors it
//! - The token is cancelled through a drop guard, so every exit path
//!   releases the call
//! - No retries, no logging here; callers decide what to record

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::config::TimeoutConfig;
use crate::http::response::RawResponse;
use crate::http::transport::TransportError;
use crate::resilience::outcome::{CallOutcome, CallPhase};
use crate::xml;

/// Deadlines for a full-form call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    /// Time allowed for the request/response exchange.
    pub call: Duration,
    /// Additional time allowed to read the whole body.
    pub read: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            call: Duration::from_secs(5),
            read: Duration::from_millis(250),
        }
    }
}

impl From<&TimeoutConfig> for Deadlines {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            call: Duration::from_millis(config.call_ms),
            read: Duration::from_millis(config.read_ms),
        }
    }
}

/// Run `call` under `deadlines`, then read and parse its body.
///
/// `call` receives the token it should watch for cancellation.
pub async fn call_with_deadlines<F, Fut>(deadlines: Deadlines, call: F) -> CallOutcome
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = Result<RawResponse, TransportError>>,
{
    let cancel = CancellationToken::new();
    let _release = cancel.clone().drop_guard();

    let response = match timeout(deadlines.call, call(cancel.clone())).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => return CallOutcome::ConnectionFailure(e),
        Err(_) => {
            cancel.cancel();
            return CallOutcome::Timeout(CallPhase::Exchange);
        }
    };

    let status = response.status;
    let body = match timeout(deadlines.read, response.read_to_end()).await {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => return CallOutcome::ConnectionFailure(e),
        Err(_) => {
            cancel.cancel();
            return CallOutcome::Timeout(CallPhase::Read);
        }
    };

    match xml::parse(&body) {
        Ok(document) if status.is_success() => CallOutcome::Success(document),
        Ok(document) => CallOutcome::HttpFailure { status, document },
        Err(error) => CallOutcome::MalformedResponse { status, error },
    }
}

/// Short-form call: `true` only if the exchange finishes within `deadline`
/// with a success status. The body is never read.
pub async fn probe<F, Fut>(deadline: Duration, call: F) -> bool
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = Result<RawResponse, TransportError>>,
{
    let cancel = CancellationToken::new();
    let _release = cancel.clone().drop_guard();

    match timeout(deadline, call(cancel.clone())).await {
        Ok(Ok(response)) => response.status.is_success(),
        Ok(Err(_)) => false,
        Err(_) => {
            cancel.cancel();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::{BufferedBody, ResponseBody};
    use async_trait::async_trait;
    use bytes::Bytes;
    use reqwest::StatusCode;

    fn fast() -> Deadlines {
        Deadlines {
            call: Duration::from_millis(100),
            read: Duration::from_millis(50),
        }
    }

    fn respond(status: StatusCode, body: &'static str) -> Result<RawResponse, TransportError> {
        Ok(RawResponse::new(status, BufferedBody::new(body)))
    }

    /// Sends one chunk, then never finishes.
    struct StalledBody {
        sent: bool,
    }

    #[async_trait]
    impl ResponseBody for StalledBody {
        async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
            if !self.sent {
                self.sent = true;
                return Ok(Some(Bytes::from_static(b"<gateways>")));
            }
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_success_parses_document() {
        let outcome = call_with_deadlines(fast(), |_| async {
            respond(StatusCode::OK, "<gateways><gateway/></gateways>")
        })
        .await;

        match outcome {
            CallOutcome::Success(doc) => assert_eq!(doc.descendants("gateway").count(), 1),
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_status_keeps_error_payload() {
        let outcome = call_with_deadlines(fast(), |_| async {
            respond(
                StatusCode::UNPROCESSABLE_ENTITY,
                "<errors><error key=\"errors.invalid\">bad</error></errors>",
            )
        })
        .await;

        match outcome {
            CallOutcome::HttpFailure { status, document } => {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
                assert_eq!(document.root().name, "errors");
            }
            other => panic!("expected http failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exchange_timeout_cancels_call() {
        let mut seen = None;
        let outcome = call_with_deadlines(fast(), |cancel| {
            seen = Some(cancel);
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                respond(StatusCode::OK, "<late/>")
            }
        })
        .await;

        assert!(matches!(outcome, CallOutcome::Timeout(CallPhase::Exchange)));
        assert!(outcome.document().is_none());
        assert!(seen.unwrap().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_body_is_read_timeout() {
        let outcome = call_with_deadlines(fast(), |_| async {
            Ok(RawResponse::new(StatusCode::OK, StalledBody { sent: false }))
        })
        .await;

        assert!(matches!(outcome, CallOutcome::Timeout(CallPhase::Read)));
    }

    #[tokio::test]
    async fn test_transport_error_is_connection_failure() {
        let outcome = call_with_deadlines(fast(), |_| async {
            Err(TransportError::Connect("connection refused".into()))
        })
        .await;

        assert!(matches!(outcome, CallOutcome::ConnectionFailure(TransportError::Connect(_))));
        assert!(outcome.document().is_none());
    }

    #[tokio::test]
    async fn test_unparseable_body_is_malformed() {
        let outcome = call_with_deadlines(fast(), |_| async {
            respond(StatusCode::OK, "<gateways><gateway></gateways>")
        })
        .await;

        match outcome {
            CallOutcome::MalformedResponse { status, .. } => assert_eq!(status, StatusCode::OK),
            other => panic!("expected malformed response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_token_released_after_success() {
        let mut seen = None;
        let outcome = call_with_deadlines(fast(), |cancel| {
            seen = Some(cancel.clone());
            async { respond(StatusCode::OK, "<ok/>") }
        })
        .await;

        assert!(outcome.is_success());
        assert!(seen.unwrap().is_cancelled());
    }

    #[tokio::test]
    async fn test_probe_reports_status_only() {
        let deadline = Duration::from_millis(100);
        assert!(probe(deadline, |_| async { respond(StatusCode::OK, "not xml at all") }).await);
        assert!(!probe(deadline, |_| async { respond(StatusCode::NOT_FOUND, "") }).await);
        assert!(
            !probe(deadline, |_| async {
                Err(TransportError::Connect("dns".into()))
            })
            .await
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_timeout_is_false() {
        let ok = probe(Duration::from_secs(30), |_| async {
            tokio::time::sleep(Duration::from_secs(31)).await;
            respond(StatusCode::OK, "")
        })
        .await;
        assert!(!ok);
    }

    #[test]
    fn test_deadlines_from_config() {
        let deadlines = Deadlines::from(&TimeoutConfig::default());
        assert_eq!(deadlines, Deadlines::default());
    }
}
