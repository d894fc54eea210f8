use crate::error::ValidatorError;
use reqwest::{Client, Method};
use std::future::Future;
use std::time::Duration;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds; `None` leaves deadlines to the caller
    pub timeout_seconds: Option<u64>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: None,
            user_agent: format!("semweb-validator/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// A single outbound request
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub body: String,
}

/// A response whose body has already been read to the end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs one request/response exchange.
///
/// Implementations must return transport failures unchanged and must consume
/// the whole response body before resolving.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, ValidatorError>> + Send;
}

/// Async HTTP transport backed by a pooled reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: HttpClientConfig,
}

impl HttpTransport {
    /// Create a new transport with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self, ValidatorError> {
        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder.build().map_err(ValidatorError::from)?;

        Ok(Self { client, config })
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        let config = HttpClientConfig::default();
        Self::new(config.clone()).unwrap_or_else(|_| Self {
            client: Client::new(),
            config,
        })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ValidatorError> {
        let response = self
            .client
            .request(request.method, &request.url)
            .body(request.body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}
