//! Metrics collection.
//!
//! # Metrics
//! - `gateway_calls_total` (counter): calls by operation and outcome
//! - `gateway_call_duration_seconds` (histogram): call latency by operation
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; installing an exporter is left
//!   to the embedding application
//! - Labels are static strings only

use std::time::Duration;

use crate::http::Operation;
use crate::resilience::FailureReason;

/// Label value for calls that succeeded.
pub const OUTCOME_SUCCESS: &str = "success";

pub fn record_call(operation: Operation, failure: Option<FailureReason>, elapsed: Duration) {
    let outcome = failure.map_or(OUTCOME_SUCCESS, |reason| reason.as_str());

    metrics::counter!(
        "gateway_calls_total",
        "operation" => operation.as_str(),
        "outcome" => outcome
    )
    .increment(1);

    metrics::histogram!(
        "gateway_call_duration_seconds",
        "operation" => operation.as_str()
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_probe(healthy: bool, elapsed: Duration) {
    metrics::counter!(
        "gateway_probes_total",
        "result" => if healthy { "ok" } else { "failed" }
    )
    .increment(1);

    metrics::histogram!("gateway_probe_duration_seconds").record(elapsed.as_secs_f64());
}
