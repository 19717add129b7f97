//! Gateway domain records.
//!
//! # Data Flow
//! ```text
//! Document (from a successful call)
//!     → mapping.rs (gateways_from_document, transaction_from_document)
//!     → types.rs (Gateway, Transaction, TransactionError)
//! ```

pub mod mapping;
pub mod types;

pub use mapping::{gateways_from_document, transaction_from_document};
pub use types::{Gateway, Transaction, TransactionError, TransactionErrorKind};
