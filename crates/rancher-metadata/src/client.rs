//! Metadata client and query executor.

use crate::transport::{ReqwestTransport, Transport, TransportRequest};
use crate::watch::{Sleeper, TokioSleeper};
use crate::Result;
use rancher_metadata_core::client::{HttpConfig, METADATA_DEFAULT_TIMEOUT};
use rancher_metadata_core::{Error, MetadataClientConfig, MetadataResponse, Resource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Builder for [`MetadataClient`].
#[derive(Clone)]
pub struct MetadataClientBuilder {
    config: MetadataClientConfig,
    http_config: Option<HttpConfig>,
    transport: Option<Arc<dyn Transport>>,
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl MetadataClientBuilder {
    /// Create a new builder from a [`MetadataClientConfig`].
    #[must_use]
    pub fn new(config: MetadataClientConfig) -> Self {
        Self {
            config,
            http_config: None,
            transport: None,
            sleeper: None,
        }
    }

    /// Override the HTTP tuning used for the default transport.
    ///
    /// A timeout left at [`METADATA_DEFAULT_TIMEOUT`] is replaced by the
    /// configured `request_timeout_secs`; any other timeout wins.
    #[must_use]
    pub fn with_http_config(mut self, http_config: HttpConfig) -> Self {
        self.http_config = Some(http_config);
        self
    }

    /// HTTP tuning the default transport is built with.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        let http_config = self.http_config.clone().unwrap_or_default();
        if http_config.timeout == Duration::from_secs(METADATA_DEFAULT_TIMEOUT) {
            http_config.with_timeout(self.config.timeout())
        } else {
            http_config
        }
    }

    /// Use a custom transport instead of the reqwest-backed default.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom sleeper for the delay between container polls.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Finalise the builder and create the [`MetadataClient`].
    pub fn build(self) -> Result<MetadataClient> {
        let http_config = self.http_config();
        let config = self.config.validated()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&http_config)?),
        };
        let sleeper = self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper));

        let endpoints = config
            .endpoints
            .iter()
            .map(|endpoint| endpoint.trim_end_matches('/').to_string())
            .collect();

        Ok(MetadataClient {
            transport,
            sleeper,
            endpoints,
            max_attempts: config.max_attempts,
            fail_on_error_status: config.fail_on_error_status,
            poll_interval: config.poll_interval(),
        })
    }
}

/// Asynchronous, read-only client for the Rancher metadata service.
///
/// Every call queries the service; nothing is cached.
#[derive(Clone)]
pub struct MetadataClient {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    endpoints: Vec<String>,
    max_attempts: u32,
    fail_on_error_status: bool,
    poll_interval: Duration,
}

impl MetadataClient {
    /// Create a client for the well-known in-container metadata endpoint.
    pub fn new() -> Result<Self> {
        MetadataClientBuilder::new(MetadataClientConfig::default()).build()
    }

    /// Construct a client directly from the configuration.
    pub fn from_config(config: &MetadataClientConfig) -> Result<Self> {
        MetadataClientBuilder::new(config.clone()).build()
    }

    /// Start a builder pre-populated with the provided configuration.
    #[must_use]
    pub fn builder(config: MetadataClientConfig) -> MetadataClientBuilder {
        MetadataClientBuilder::new(config)
    }

    /// Endpoint base URLs in the order they are tried.
    #[must_use]
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Number of rounds over the endpoint list per query.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay between container polls while waiting for a service to scale.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub(crate) fn sleeper(&self) -> &dyn Sleeper {
        self.sleeper.as_ref()
    }

    /// Resolve a resource to its path and fetch it.
    pub async fn fetch_resource(&self, resource: Resource<'_>) -> Result<MetadataResponse> {
        let path = resource.path()?;
        self.fetch(&path).await
    }

    /// Fetch a query path, failing over across endpoints.
    ///
    /// Each attempt round tries the endpoints in order and the first endpoint
    /// that answers ends the query, whatever the HTTP status (unless
    /// `fail_on_error_status` is set). A `{"code": 404}` body is returned as
    /// [`MetadataResponse::Absent`] in both modes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExhausted`] when every endpoint failed on every
    /// attempt round.
    pub async fn fetch(&self, path: &str) -> Result<MetadataResponse> {
        let mut failures = 0usize;
        let mut last_error: Option<Error> = None;

        for attempt in 1..=self.max_attempts {
            for endpoint in &self.endpoints {
                let request = TransportRequest::json_get(format!("{endpoint}{path}"));
                debug!(endpoint = %endpoint, path, attempt, "querying metadata");

                let error = match self.transport.get(&request).await {
                    Ok(response) => {
                        let decoded = MetadataResponse::from_body(&response.body);
                        if decoded.is_absent()
                            || !self.fail_on_error_status
                            || response.is_success()
                        {
                            return Ok(decoded);
                        }
                        Error::HttpError(format!(
                            "metadata endpoint answered with status {}",
                            response.status
                        ))
                    }
                    Err(err) => err,
                };

                warn!(
                    endpoint = %endpoint,
                    path,
                    attempt,
                    error = %error,
                    "Failed to query metadata endpoint"
                );
                failures += 1;
                last_error = Some(error);
            }
        }

        let last_error = last_error
            .map_or_else(|| "no endpoint answered".to_string(), |e| e.to_string());
        error!(path, attempts = self.max_attempts, failures, "metadata query exhausted");

        Err(Error::QueryExhausted {
            path: path.to_string(),
            attempts: self.max_attempts,
            failures,
            last_error,
        })
    }

    /// Fetch a resource and map it onto a typed model, `None` when absent.
    pub async fn get_as<T>(&self, resource: Resource<'_>) -> Result<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        self.fetch_resource(resource).await?.decode()
    }
}
