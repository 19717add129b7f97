//! HTTP layer between the facade and the gateway API.
//!
//! # Data Flow
//! ```text
//! GatewayService operation
//!     → request.rs (ApiRequest: method, path, XML body)
//!     → transport.rs (Transport::send, cancellable)
//!     → response.rs (RawResponse: status + streamed body)
//!     → resilience::timeouts (deadlines, parse)
//! ```
//!
//! # Design Decisions
//! - The transport is a trait so the orchestrator and facade can be driven
//!   by scripted transports in tests
//! - Bodies are streamed chunk by chunk; reading is a separate, separately
//!   bounded phase
//! - Certificate validation stays on unless explicitly overridden

pub mod request;
pub mod response;
pub mod transport;

pub use request::{ApiRequest, Operation};
pub use response::{RawResponse, ResponseBody};
pub use transport::{ApiAuth, ReqwestTransport, Transport, TransportError};
