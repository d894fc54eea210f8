//! Structured-data validation client
//!
//! Submits raw markup to the remote document parser and decodes the
//! microdata, RDFa, microformat and JSON-LD blocks it extracted.

use std::future::Future;
use std::time::Duration;

use reqwest::{Method, Url};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::ValidatorConfig;
use crate::error::{Result, ServiceError, ValidatorError};
use crate::http_client::{HttpClientConfig, HttpTransport, Transport, TransportRequest};

/// One extracted block of structured data; its shape is defined by the service
pub type StructuredItem = Map<String, Value>;

/// Successful response of the document parser
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Identifier the service assigned to this validation run
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: StructuredData,
}

/// Structured data found in the document, grouped by standard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub microdata: Vec<StructuredItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rdfa: Vec<StructuredItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub microformat: Vec<StructuredItem>,
    #[serde(rename = "json-ld", default, deserialize_with = "null_as_default")]
    pub json_ld: Vec<StructuredItem>,
}

impl StructuredData {
    pub fn is_empty(&self) -> bool {
        self.total_items() == 0
    }

    pub fn total_items(&self) -> usize {
        self.microdata.len() + self.rdfa.len() + self.microformat.len() + self.json_ld.len()
    }

    /// Sections in wire order, labelled with their wire names
    pub fn sections(&self) -> [(&'static str, &[StructuredItem]); 4] {
        [
            ("microdata", self.microdata.as_slice()),
            ("rdfa", self.rdfa.as_slice()),
            ("microformat", self.microformat.as_slice()),
            ("json-ld", self.json_ld.as_slice()),
        ]
    }
}

/// Treats an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Where document checks are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
    credential_param: String,
}

impl Endpoint {
    pub fn from_config(config: &ValidatorConfig) -> Result<Self> {
        let raw = format!("{}{}", config.base_url.trim_end_matches('/'), config.path());
        let url = Url::parse(&raw).map_err(|e| ValidatorError::InvalidUrl {
            url: raw.clone(),
            details: e.to_string(),
        })?;

        Ok(Self {
            url,
            credential_param: config.credential_param().to_string(),
        })
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn credential_param(&self) -> &str {
        &self.credential_param
    }

    /// Full request URL carrying the credential as a query parameter
    fn request_url(&self, token: &str) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair(&self.credential_param, token);
        url
    }
}

/// Client for the document parser.
///
/// Holds no per-call state, so a single value (or its clones, which share the
/// connection pool) can serve any number of concurrent checks.
#[derive(Debug, Clone)]
pub struct Validator<T: Transport = HttpTransport> {
    token: String,
    endpoint: Endpoint,
    transport: T,
}

impl Validator<HttpTransport> {
    /// Create a validator for the hosted service with default settings
    pub fn new(token: impl Into<String>) -> Self {
        let endpoint = Endpoint::from_config(&ValidatorConfig::default())
            .expect("default service URL is valid");
        Self {
            token: token.into(),
            endpoint,
            transport: HttpTransport::default(),
        }
    }

    /// Create a validator using the reqwest transport built from `config`
    pub fn with_config(token: impl Into<String>, config: &ValidatorConfig) -> Result<Self> {
        let transport = HttpTransport::new(HttpClientConfig {
            timeout_seconds: config.timeout_seconds,
            user_agent: config.user_agent.clone(),
        })?;
        Self::with_transport(token, config, transport)
    }
}

impl<T: Transport> Validator<T> {
    /// Create a validator that sends requests through `transport`
    pub fn with_transport(
        token: impl Into<String>,
        config: &ValidatorConfig,
        transport: T,
    ) -> Result<Self> {
        Ok(Self {
            token: token.into(),
            endpoint: Endpoint::from_config(config)?,
            transport,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit `document` for parsing.
    ///
    /// Issues exactly one request. Dropping the returned future aborts it.
    pub async fn check_document(&self, document: &str) -> Result<ValidationResult> {
        debug!(
            path = self.endpoint.path(),
            bytes = document.len(),
            "submitting document"
        );

        let response = self
            .transport
            .send(TransportRequest {
                method: Method::POST,
                url: self.endpoint.request_url(&self.token).into(),
                body: document.to_string(),
            })
            .await?;

        if response.status != 200 {
            let error: ServiceError =
                serde_json::from_slice(&response.body).map_err(|source| ValidatorError::Decode {
                    status: response.status,
                    source,
                })?;
            warn!(status = response.status, error = %error, "service rejected document");
            return Err(ValidatorError::Service {
                status: response.status,
                error,
            });
        }

        let result: ValidationResult =
            serde_json::from_slice(&response.body).map_err(|source| ValidatorError::Decode {
                status: response.status,
                source,
            })?;

        debug!(
            id = %result.id,
            microdata = result.data.microdata.len(),
            rdfa = result.data.rdfa.len(),
            microformat = result.data.microformat.len(),
            json_ld = result.data.json_ld.len(),
            "document parsed"
        );

        Ok(result)
    }

    /// Submit `document`, giving up with [`ValidatorError::Cancelled`] as soon
    /// as `cancel` resolves.
    ///
    /// A `cancel` future that is already complete wins before any request is
    /// sent.
    pub async fn check_document_until<C>(
        &self,
        document: &str,
        cancel: C,
    ) -> Result<ValidationResult>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                debug!("document check cancelled");
                Err(ValidatorError::Cancelled)
            }
            result = self.check_document(document) => result,
        }
    }

    /// Submit `document` with a deadline
    pub async fn check_document_with_timeout(
        &self,
        document: &str,
        timeout: Duration,
    ) -> Result<ValidationResult> {
        tokio::time::timeout(timeout, self.check_document(document))
            .await
            .map_err(|_| ValidatorError::Timeout {
                timeout_ms: timeout_millis(timeout),
            })?
    }
}

/// Milliseconds in `timeout`, saturating at `u64::MAX`
fn timeout_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}
