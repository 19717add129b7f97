//! Cancellable transports for gateway API calls.
//!
//! # Responsibilities
//! - Issue one HTTP request per `send`
//! - Honor the cancellation token while the exchange is in flight
//! - Surface DNS, TLS and connection errors as `TransportError`

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::{ApiConfig, TlsConfig};
use crate::http::request::ApiRequest;
use crate::http::response::{RawResponse, ResponseBody};

const XML_CONTENT_TYPE: &str = "application/xml";

/// Errors raised by a transport before a response completes.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Could not connect, resolve or negotiate TLS.
    #[error("connection error: {0}")]
    Connect(String),

    /// The exchange started but failed (reset, protocol error, broken body).
    #[error("request error: {0}")]
    Request(String),

    /// The call was cancelled before it completed.
    #[error("request cancelled")]
    Cancelled,

    /// The transport could not be constructed.
    #[error("client build error: {0}")]
    Build(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_builder() {
            TransportError::Build(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// The asynchronous call producer the orchestrator drives.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue `request`, resolving once the status line and headers arrive.
    ///
    /// Implementations should stop work when `cancel` fires; the caller
    /// stops waiting either way.
    async fn send(
        &self,
        request: ApiRequest,
        cancel: CancellationToken,
    ) -> Result<RawResponse, TransportError>;
}

/// Basic-auth identity sent with every request.
#[derive(Clone)]
pub struct ApiAuth {
    pub application_id: String,
    pub master_key: String,
}

impl std::fmt::Debug for ApiAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiAuth")
            .field("application_id", &self.application_id)
            .field("master_key", &"<redacted>")
            .finish()
    }
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    auth: ApiAuth,
}

impl ReqwestTransport {
    /// Build a transport for the configured API endpoint.
    pub fn new(api: &ApiConfig, tls: &TlsConfig, auth: ApiAuth) -> Result<Self, TransportError> {
        let base_url = normalize_base(&api.base_url)?;

        if tls.accept_invalid_certs {
            tracing::warn!(
                base_url = %base_url,
                "TLS certificate validation disabled for this client"
            );
        }

        let client = Client::builder()
            .user_agent(api.user_agent.as_str())
            .danger_accept_invalid_certs(tls.accept_invalid_certs)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            auth,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        if let Some(bad) = request
            .segments
            .iter()
            .find(|segment| matches!(segment.as_str(), "" | "." | ".."))
        {
            return Err(TransportError::Build(format!(
                "invalid path segment '{}' in {}",
                bad,
                request.path()
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::Build(format!("base URL '{}' cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(&request.segments);
        Ok(url)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: ApiRequest,
        cancel: CancellationToken,
    ) -> Result<RawResponse, TransportError> {
        let url = self.url_for(&request)?;

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .basic_auth(&self.auth.application_id, Some(&self.auth.master_key))
            .header(ACCEPT, HeaderValue::from_static(XML_CONTENT_TYPE));

        if let Some(body) = request.body {
            builder = builder
                .header(CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE))
                .body(body);
        }

        let body_cancel = cancel.clone();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
            response = builder.send() => {
                let response = response?;
                Ok(RawResponse {
                    status: response.status(),
                    body: Box::new(CancellableBody { response, cancel: body_cancel }),
                })
            }
        }
    }
}

/// Response body that stops streaming once the call is cancelled.
struct CancellableBody {
    response: reqwest::Response,
    cancel: CancellationToken,
}

#[async_trait]
impl ResponseBody for CancellableBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(TransportError::Cancelled),
            chunk = self.response.chunk() => chunk.map_err(TransportError::from),
        }
    }
}

fn normalize_base(raw: &str) -> Result<Url, TransportError> {
    let url = Url::parse(raw)
        .map_err(|e| TransportError::Build(format!("invalid base URL '{}': {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(TransportError::Build(format!("base URL '{}' cannot take a path", raw)));
    }
    Ok(url)
}
