//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! GatewayService (one span per call, tagged with a call id)
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Call ID flows through every event of a call
//! - Metrics are cheap (atomic increments) and exporter-agnostic

pub mod logging;
pub mod metrics;
