//! Mapping parsed API documents onto domain records.

use crate::gateway::types::{Gateway, Transaction, TransactionError, TransactionErrorKind};
use crate::xml::{Document, Element};

/// Every `gateway` element in the document, in document order.
///
/// Entries without a token are skipped.
pub fn gateways_from_document(document: &Document) -> Vec<Gateway> {
    document
        .descendants("gateway")
        .filter_map(|element| {
            let gateway = gateway_from_element(element);
            if gateway.is_none() {
                tracing::warn!(line = element.line, "skipping gateway entry without a token");
            }
            gateway
        })
        .collect()
}

pub fn gateway_from_element(element: &Element) -> Option<Gateway> {
    let token = non_empty(element.child_text("token"))?;
    let state = non_empty(element.child_text("state"));
    let redacted = element
        .child_bool("redacted")
        .unwrap_or_else(|| state.as_deref() == Some("redacted"));
    let enabled = element.child_bool("enabled").unwrap_or(!redacted);

    Some(Gateway {
        token,
        gateway_type: non_empty(element.child_text("gateway_type")).unwrap_or_default(),
        name: non_empty(element.child_text("name")),
        state,
        enabled,
        redacted,
    })
}

/// The first `transaction` element of the document, if there is one.
pub fn transaction_from_document(document: &Document) -> Option<Transaction> {
    let element = document.descendants("transaction").next()?;
    Some(transaction_from_element(element))
}

pub fn transaction_from_element(element: &Element) -> Transaction {
    let payment_method_token = element
        .child("payment_method")
        .and_then(|pm| non_empty(pm.child_text("token")))
        .or_else(|| non_empty(element.child_text("payment_method_token")));

    let amount_cents = element.child_text("amount").and_then(|text| {
        let parsed = text.trim().parse::<i64>().ok();
        if parsed.is_none() {
            tracing::warn!(line = element.line, amount = %text, "unparseable transaction amount");
        }
        parsed
    });

    let errors = element
        .descendants("error")
        .map(|error| TransactionError {
            attribute: error.attribute("attribute").unwrap_or_default().to_string(),
            key: error.attribute("key").unwrap_or_default().to_string(),
            message: error.text.clone(),
            kind: TransactionErrorKind::Gateway,
        })
        .collect();

    Transaction {
        token: non_empty(element.child_text("token")),
        transaction_type: non_empty(element.child_text("transaction_type")),
        succeeded: element.child_bool("succeeded").unwrap_or(false),
        state: non_empty(element.child_text("state")),
        message: non_empty(element.child_text("message")),
        amount_cents,
        currency_code: non_empty(element.child_text("currency_code")),
        gateway_token: non_empty(element.child_text("gateway_token")),
        payment_method_token,
        on_test_gateway: element.child_bool("on_test_gateway").unwrap_or(false),
        errors,
    }
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
