#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Url;
use semweb_validator::{Transport, TransportRequest, TransportResponse, ValidatorError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub const SAMPLE_DOCUMENT: &str = r#"<html><body>
<div itemscope itemtype="http://schema.org/Product"><span itemprop="name">Kettle</span></div>
<script type="application/ld+json">{"@context":"http://schema.org","@type":"Organization","name":"Acme"}</script>
</body></html>"#;

pub const SAMPLE_RESPONSE: &str = r#"{
    "id": "b1946ac92492d2347c6235b4d2611184",
    "data": {
        "microdata": [{"type": ["http://schema.org/Product"], "properties": {"name": ["Kettle"]}}],
        "rdfa": [],
        "microformat": [],
        "json-ld": [{"@context": "http://schema.org", "@type": "Organization", "name": "Acme"}]
    }
}"#;

/// A request as seen by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    /// Header names are lowercased
    pub headers: HashMap<String, String>,
    pub body: String,
}

type Handler = dyn Fn(&RecordedRequest) -> (u16, String) + Send + Sync;

/// Minimal HTTP/1.1 server on a loopback port, one request per connection
pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl MockServer {
    /// Answer every request with the same status and body
    pub async fn start(status: u16, body: &str) -> Self {
        let body = body.to_string();
        Self::start_with(None, move |_| (status, body.clone())).await
    }

    /// Like [`MockServer::start`] but waits `delay` before answering
    pub async fn start_delayed(status: u16, body: &str, delay: Duration) -> Self {
        let body = body.to_string();
        Self::start_with(Some(delay), move |_| (status, body.clone())).await
    }

    pub async fn start_with<F>(delay: Option<Duration>, handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let log = requests.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let log = log.clone();
                let handler = handler.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, log, handler, delay).await;
                });
            }
        });

        Self {
            addr,
            requests,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(
    mut stream: TcpStream,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
    handler: Arc<Handler>,
    delay: Option<Duration>,
) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();
    let content_length = headers
        .get("content-length")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    let url = Url::parse(&format!("http://localhost{}", target)).unwrap();
    let request = RecordedRequest {
        method,
        path: url.path().to_string(),
        query: url.query_pairs().into_owned().collect(),
        headers,
        body: String::from_utf8_lossy(&buffer[header_end..]).to_string(),
    };
    log.lock().unwrap().push(request.clone());

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let (status, body) = handler(&request);
    let response = format!(
        "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

/// In-process transport returning canned responses and logging requests
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<Vec<MockReply>>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

#[derive(Clone, Debug)]
pub enum MockReply {
    Response(u16, String),
    ConnectionRefused,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, reply: MockReply) -> Self {
        self.responses.lock().unwrap().push(reply);
        self
    }

    pub fn with_response(self, status: u16, body: &str) -> Self {
        self.with_reply(MockReply::Response(status, body.to_string()))
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ValidatorError> {
        self.requests.lock().unwrap().push(request);

        // The last queued reply repeats once the queue is down to one.
        let reply = {
            let mut responses = self.responses.lock().unwrap();
            if responses.len() > 1 {
                responses.remove(0)
            } else {
                responses
                    .first()
                    .cloned()
                    .unwrap_or(MockReply::Response(500, r#"{"error":"no reply"}"#.into()))
            }
        };

        match reply {
            MockReply::Response(status, body) => Ok(TransportResponse::new(status, body)),
            MockReply::ConnectionRefused => Err(ValidatorError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
        }
    }
}
