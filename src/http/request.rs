//! Request descriptions for each gateway API operation.

use std::collections::BTreeMap;

use quick_xml::escape::escape;
use reqwest::Method;

/// The API operation a request performs. Used for logs and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListGateways,
    CreateGateway,
    ShowGateway,
    RedactGateway,
    Purchase,
    VerifyPaymentMethod,
    RetainPaymentMethod,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ListGateways => "list_gateways",
            Operation::CreateGateway => "create_gateway",
            Operation::ShowGateway => "show_gateway",
            Operation::RedactGateway => "redact_gateway",
            Operation::Purchase => "purchase",
            Operation::VerifyPaymentMethod => "verify_payment_method",
            Operation::RetainPaymentMethod => "retain_payment_method",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a transport needs to issue one API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub operation: Operation,
    pub method: Method,
    /// Path segments under the API base URL. Caller-supplied tokens are
    /// always a single segment; the transport percent-encodes each one.
    pub segments: Vec<String>,
    /// XML request body, if the call has one.
    pub body: Option<String>,
}

impl ApiRequest {
    /// Unencoded path for logs and assertions, e.g. `v1/gateways.xml`.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// `GET v1/gateways.xml`
    pub fn list_gateways() -> Self {
        Self {
            operation: Operation::ListGateways,
            method: Method::GET,
            segments: segments(["v1", "gateways.xml"]),
            body: None,
        }
    }

    /// `POST v1/gateways.xml` with the gateway type and any extra
    /// gateway-specific fields (credentials, login, etc).
    pub fn create_gateway(gateway_type: &str, fields: &BTreeMap<String, String>) -> Self {
        let mut body = String::from("<gateway>");
        push_field(&mut body, "gateway_type", gateway_type);
        for (name, value) in fields {
            push_field(&mut body, name, value);
        }
        body.push_str("</gateway>");

        Self {
            operation: Operation::CreateGateway,
            method: Method::POST,
            segments: segments(["v1", "gateways.xml"]),
            body: Some(body),
        }
    }

    /// `GET v1/gateways/{token}.xml`
    pub fn show_gateway(gateway_token: &str) -> Self {
        Self {
            operation: Operation::ShowGateway,
            method: Method::GET,
            segments: segments(["v1", "gateways", &format!("{}.xml", gateway_token)]),
            body: None,
        }
    }

    /// `PUT v1/gateways/{token}/redact.xml`
    pub fn redact_gateway(gateway_token: &str) -> Self {
        Self {
            operation: Operation::RedactGateway,
            method: Method::PUT,
            segments: segments(["v1", "gateways", gateway_token, "redact.xml"]),
            body: None,
        }
    }

    /// `POST v1/gateways/{gateway}/purchase.xml`. The amount is in minor units.
    pub fn purchase(
        gateway_token: &str,
        payment_method_token: &str,
        amount_cents: i64,
        currency_code: &str,
    ) -> Self {
        let mut body = String::from("<transaction>");
        push_field(&mut body, "payment_method_token", payment_method_token);
        push_field(&mut body, "amount", &amount_cents.to_string());
        push_field(&mut body, "currency_code", currency_code);
        body.push_str("</transaction>");

        Self {
            operation: Operation::Purchase,
            method: Method::POST,
            segments: segments(["v1", "gateways", gateway_token, "purchase.xml"]),
            body: Some(body),
        }
    }

    /// `POST v1/gateways/{gateway}/verify.xml`
    pub fn verify_payment_method(gateway_token: &str, payment_method_token: &str) -> Self {
        let mut body = String::from("<transaction>");
        push_field(&mut body, "payment_method_token", payment_method_token);
        body.push_str("</transaction>");

        Self {
            operation: Operation::VerifyPaymentMethod,
            method: Method::POST,
            segments: segments(["v1", "gateways", gateway_token, "verify.xml"]),
            body: Some(body),
        }
    }

    /// `PUT v1/payment_methods/{token}/retain.xml`
    pub fn retain_payment_method(payment_method_token: &str) -> Self {
        Self {
            operation: Operation::RetainPaymentMethod,
            method: Method::PUT,
            segments: segments(["v1", "payment_methods", payment_method_token, "retain.xml"]),
            body: None,
        }
    }
}

fn segments<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

fn push_field(body: &mut String, name: &str, value: &str) {
    body.push('<');
    body.push_str(name);
    body.push('>');
    body.push_str(&escape(value));
    body.push_str("</");
    body.push_str(name);
    body.push('>');
}
