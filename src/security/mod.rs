//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Configuration / environment
//!     → credentials.rs (SecurityKeys: identity + swappable tokens)
//!     → http::transport (basic auth on every request)
//! ```
//!
//! # Design Decisions
//! - Secrets never appear in Debug output or logs
//! - Certificate validation is always on unless the configuration opts out
//!   explicitly (see `config::TlsConfig`)

pub mod credentials;

pub use credentials::SecurityKeys;
