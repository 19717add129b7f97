//! Raw responses handed back by a transport.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;

use crate::http::transport::TransportError;

/// A response body that is still arriving.
#[async_trait]
pub trait ResponseBody: Send {
    /// Next chunk of the body, `None` once the body is complete.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError>;
}

/// Status line has arrived; the body may still be streaming.
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Box<dyn ResponseBody>,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl ResponseBody + 'static) -> Self {
        Self {
            status,
            body: Box::new(body),
        }
    }

    /// Drain the body into a single buffer.
    pub async fn read_to_end(mut self) -> Result<Vec<u8>, TransportError> {
        let mut buf = Vec::new();
        while let Some(chunk) = self.body.next_chunk().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf)
    }
}

impl std::fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// A body that is already fully in memory.
#[derive(Debug, Clone, Default)]
pub struct BufferedBody {
    remaining: Option<Bytes>,
}

impl BufferedBody {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            remaining: Some(body.into()),
        }
    }
}

#[async_trait]
impl ResponseBody for BufferedBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        Ok(self.remaining.take().filter(|chunk| !chunk.is_empty()))
    }
}
