//! Gateway domain types.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

/// A configured downstream payment processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gateway {
    pub token: String,
    /// Processor type, e.g. `test`, `stripe`.
    pub gateway_type: String,
    pub name: Option<String>,
    /// `retained` or `redacted` as reported by the API.
    pub state: Option<String>,
    pub enabled: bool,
    pub redacted: bool,
}

/// Where a transaction error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionErrorKind {
    /// No enabled gateway of the requested type; nothing was sent.
    InvalidGateway,
    /// The call was issued but did not produce a usable transaction.
    CallFailed,
    /// Reported by the gateway inside the response payload.
    Gateway,
}

/// A single error attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionError {
    /// Field the error refers to, empty when not field-specific.
    pub attribute: String,
    /// Machine-readable key, e.g. `errors.blank`.
    pub key: String,
    pub message: String,
    pub kind: TransactionErrorKind,
}

impl TransactionError {
    pub fn new(kind: TransactionErrorKind, message: impl Into<String>) -> Self {
        Self {
            attribute: String::new(),
            key: String::new(),
            message: message.into(),
            kind,
        }
    }
}

/// Result of a purchase, verify or retain call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub token: Option<String>,
    pub transaction_type: Option<String>,
    pub succeeded: bool,
    pub state: Option<String>,
    pub message: Option<String>,
    /// Amount in minor units (cents).
    pub amount_cents: Option<i64>,
    pub currency_code: Option<String>,
    pub gateway_token: Option<String>,
    pub payment_method_token: Option<String>,
    pub on_test_gateway: bool,
    pub errors: Vec<TransactionError>,
}

impl Transaction {
    /// A transaction synthesized locally for a failure that never produced
    /// (or could not use) a gateway response.
    pub fn failed(
        on_test_gateway: bool,
        kind: TransactionErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            token: None,
            transaction_type: None,
            succeeded: false,
            state: None,
            message: None,
            amount_cents: None,
            currency_code: None,
            gateway_token: None,
            payment_method_token: None,
            on_test_gateway,
            errors: vec![TransactionError::new(kind, message)],
        }
    }

    /// Kind of the first error, if the transaction carries any.
    pub fn error_kind(&self) -> Option<TransactionErrorKind> {
        self.errors.first().map(|error| error.kind)
    }

    /// Amount in major units.
    pub fn amount(&self) -> Option<Decimal> {
        self.amount_cents.map(|cents| Decimal::new(cents, 2))
    }
}

/// Convert a positive major-unit amount into minor units, rounding to the
/// nearest cent. `None` if the rounded amount is not positive or does not fit.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round()
        .to_i64()
        .filter(|cents| *cents > 0)
}

/// Whether a gateway type names the sandbox gateway.
pub fn is_test_gateway(gateway_type: &str) -> bool {
    gateway_type.eq_ignore_ascii_case("test")
}
