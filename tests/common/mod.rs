//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use spreedly_client::http::response::BufferedBody;
use spreedly_client::http::{ApiRequest, Operation, RawResponse, Transport, TransportError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

/// What a mock backend sends back for one connection.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub body: String,
    /// Delay before the status line is written.
    pub header_delay: Duration,
    /// Delay between the headers and the body.
    pub body_delay: Duration,
}

impl MockReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            header_delay: Duration::ZERO,
            body_delay: Duration::ZERO,
        }
    }

    pub fn delayed_headers(mut self, delay: Duration) -> Self {
        self.header_delay = delay;
        self
    }

    pub fn stalled_body(mut self, delay: Duration) -> Self {
        self.body_delay = delay;
        self
    }
}

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Handle to a running mock backend.
pub struct MockServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a mock backend that returns the same reply to every request.
pub async fn start_mock_backend(reply: MockReply) -> MockServer {
    start_programmable_backend(move |_| {
        let reply = reply.clone();
        async move { reply }
    })
    .await
}

/// Start a programmable mock backend on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> MockServer
where
    F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockReply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        recorded.lock().unwrap().push(request.clone());

                        let reply = f(request).await;
                        write_reply(&mut socket, reply).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockServer { addr, requests }
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

async fn write_reply(socket: &mut TcpStream, reply: MockReply) {
    tokio::time::sleep(reply.header_delay).await;

    let reason = StatusCode::from_u16(reply.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        reply.status,
        reason,
        reply.body.len()
    );
    if socket.write_all(head.as_bytes()).await.is_err() {
        return;
    }
    let _ = socket.flush().await;

    tokio::time::sleep(reply.body_delay).await;
    let _ = socket.write_all(reply.body.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Scripted behavior for one operation.
#[derive(Debug, Clone)]
pub enum Script {
    Reply(u16, String),
    Fail(TransportError),
    /// Never answers; resolves only when cancelled.
    Hang,
}

/// In-process transport with canned answers per operation.
///
/// Operations without a script fail with a connection error.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<Operation, Script>>,
    sent: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, operation: Operation, script: Script) -> Self {
        self.scripts.lock().unwrap().insert(operation, script);
        self
    }

    pub fn reply(self, operation: Operation, status: u16, body: &str) -> Self {
        self.script(operation, Script::Reply(status, body.to_string()))
    }

    pub fn calls(&self, operation: Operation) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.operation == operation)
            .count()
    }

    pub fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: ApiRequest,
        cancel: CancellationToken,
    ) -> Result<RawResponse, TransportError> {
        let script = self.scripts.lock().unwrap().get(&request.operation).cloned();
        self.sent.lock().unwrap().push(request);

        match script {
            Some(Script::Reply(status, body)) => Ok(RawResponse::new(
                StatusCode::from_u16(status).unwrap(),
                BufferedBody::new(body),
            )),
            Some(Script::Fail(error)) => Err(error),
            Some(Script::Hang) => {
                cancel.cancelled().await;
                Err(TransportError::Cancelled)
            }
            None => Err(TransportError::Connect("no script".to_string())),
        }
    }
}
