//! HTTP transport used by the metadata client.
//!
//! The client only needs one capability from the network: issue a GET and hand
//! back the status and body. [`Transport`] abstracts that so the query executor
//! can be driven by a mock in tests; [`ReqwestTransport`] is the real thing.

use crate::Result;
use async_trait::async_trait;
use rancher_metadata_core::client::HttpConfig;
use rancher_metadata_core::Error;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder};
use tracing::trace;

const USER_AGENT: &str = concat!("rancher-metadata/", env!("CARGO_PKG_VERSION"));

/// A single GET request against one metadata endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// Fully joined request URL
    pub url: String,
    /// Request headers
    pub headers: HeaderMap,
}

impl TransportRequest {
    /// Build a GET request that asks for JSON.
    #[must_use]
    pub fn json_get(url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self {
            url: url.into(),
            headers,
        }
    }
}

/// Status and body of a response from one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl TransportResponse {
    /// Create a response from its parts.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Capability to perform a GET against a metadata endpoint.
///
/// Implementations report connection problems, timeouts and unreadable bodies
/// as errors. Any response that arrives, whatever its status, is returned.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the request.
    async fn get(&self, request: &TransportRequest) -> Result<TransportResponse>;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Build a transport using the given HTTP tuning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the underlying client cannot be built.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host);

        if !config.enable_compression {
            builder = builder.no_gzip();
        }

        let http = builder.build().map_err(|err| {
            Error::ConfigError(format!("Failed to build metadata HTTP client: {err}"))
        })?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: &TransportRequest) -> Result<TransportResponse> {
        let response = self
            .http
            .get(request.url.as_str())
            .headers(request.headers.clone())
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        trace!(url = %request.url, status, bytes = body.len(), "metadata response received");

        Ok(TransportResponse::new(status, body))
    }
}
