//! Normalized call outcomes.

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::http::transport::TransportError;
use crate::xml::{Document, XmlError};

/// Which bounded phase of a call ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallPhase {
    /// Waiting for the status line and headers.
    Exchange,
    /// Reading the response body after the exchange completed.
    Read,
}

impl std::fmt::Display for CallPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallPhase::Exchange => f.write_str("exchange"),
            CallPhase::Read => f.write_str("read"),
        }
    }
}

/// The single result of one orchestrated call.
///
/// A document is carried only by `Success` and `HttpFailure`.
#[derive(Debug, Clone)]
pub enum CallOutcome {
    /// Success status, body parsed.
    Success(Document),
    /// Failure status, but the body (usually an error payload) parsed.
    HttpFailure {
        status: StatusCode,
        document: Document,
    },
    /// A deadline elapsed; the call was cancelled.
    Timeout(CallPhase),
    /// The transport failed before the response completed.
    ConnectionFailure(TransportError),
    /// The body arrived in time but is not a well-formed document.
    MalformedResponse {
        status: StatusCode,
        error: XmlError,
    },
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }

    /// The parsed body, for `Success` and `HttpFailure` only.
    pub fn document(&self) -> Option<&Document> {
        match self {
            CallOutcome::Success(document) | CallOutcome::HttpFailure { document, .. } => {
                Some(document)
            }
            _ => None,
        }
    }

    /// The parsed body of a successful call; every failure yields `None`.
    pub fn into_success(self) -> Option<Document> {
        match self {
            CallOutcome::Success(document) => Some(document),
            _ => None,
        }
    }

    /// Failure kind, or `None` for `Success`.
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            CallOutcome::Success(_) => None,
            CallOutcome::HttpFailure { .. } => Some(FailureReason::HttpFailure),
            CallOutcome::Timeout(_) => Some(FailureReason::Timeout),
            CallOutcome::ConnectionFailure(_) => Some(FailureReason::ConnectionFailure),
            CallOutcome::MalformedResponse { .. } => Some(FailureReason::MalformedResponse),
        }
    }

    /// Status of a completed call that did not succeed.
    pub fn failure_status(&self) -> Option<StatusCode> {
        match self {
            CallOutcome::HttpFailure { status, .. } | CallOutcome::MalformedResponse { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Why a call (or an operation built on one) did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    #[error("call timed out")]
    Timeout,
    #[error("connection failed")]
    ConnectionFailure,
    #[error("gateway API returned a failure status")]
    HttpFailure,
    #[error("response body is not well-formed XML")]
    MalformedResponse,
    #[error("expected results were not found in the response")]
    ResultsNotFound,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::Timeout => "timeout",
            FailureReason::ConnectionFailure => "connection_failure",
            FailureReason::HttpFailure => "http_failure",
            FailureReason::MalformedResponse => "malformed_response",
            FailureReason::ResultsNotFound => "results_not_found",
        }
    }
}
