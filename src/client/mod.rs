//! Public client facade.
//!
//! # Data Flow
//! ```text
//! Caller
//!     → service.rs (GatewayService operation)
//!     → http::request (ApiRequest)
//!     → resilience::timeouts (bounded call)
//!     → gateway::mapping (Gateway / Transaction)
//!     → operation-specific return value
//! ```
//!
//! # Design Decisions
//! - One network call per step, never retried
//! - Payment operations resolve their gateway first and never touch the
//!   network for payment when none is enabled
//! - Credential updates go through `SecurityKeys`, safe to share

pub mod service;

pub use service::GatewayService;
