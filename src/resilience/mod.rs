//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Facade operation:
//!     → timeouts.rs (call deadline, cancel on expiry)
//!     → timeouts.rs (read deadline over the streamed body, parse)
//!     → outcome.rs (CallOutcome / FailureReason)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - A single attempt per invocation; retrying is the caller's business
//! - Outcomes are an explicit sum type matched exhaustively, never errors
//!   thrown through the stack

pub mod outcome;
pub mod timeouts;

pub use outcome::{CallOutcome, CallPhase, FailureReason};
pub use timeouts::{call_with_deadlines, probe, Deadlines};
