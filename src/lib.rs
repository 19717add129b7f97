//! Spreedly gateway API client library

pub mod client;
pub mod config;
pub mod gateway;
pub mod http;
pub mod observability;
pub mod resilience;
pub mod security;
pub mod xml;

pub use client::GatewayService;
pub use config::schema::ClientConfig;
pub use gateway::{Gateway, Transaction, TransactionErrorKind};
pub use resilience::{CallOutcome, FailureReason};
