//! Configuration structures for metadata clients.
//!
//! A [`MetadataClientConfig`] names the metadata endpoints to query (treated as
//! interchangeable mirrors) and how many rounds over them a query may take.

use crate::client::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS, METADATA_DEFAULT_TIMEOUT};
use crate::Error;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Well-known metadata endpoint reachable from inside a managed container.
pub const DEFAULT_METADATA_URL: &str = "http://rancher-metadata/2015-12-19";

/// Configuration for a metadata client instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct MetadataClientConfig {
    /// Metadata base URLs, tried in order
    #[validate(length(min = 1))]
    #[serde(
        alias = "api_url",
        default = "default_endpoints",
        deserialize_with = "deserialize_endpoints"
    )]
    pub endpoints: Vec<String>,

    /// Number of rounds over the endpoint list before giving up
    #[validate(range(min = 1))]
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Per-request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Treat non-2xx responses as endpoint failures instead of answers
    #[serde(default)]
    pub fail_on_error_status: bool,

    /// Delay between container polls while waiting for a service to scale
    #[validate(range(min = 1))]
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_endpoints() -> Vec<String> {
    vec![DEFAULT_METADATA_URL.to_string()]
}

const fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

const fn default_request_timeout_secs() -> u64 {
    METADATA_DEFAULT_TIMEOUT
}

const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Accepts either a single URL or a list of URLs.
fn deserialize_endpoints<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(url) => vec![url],
        OneOrMany::Many(urls) => urls,
    })
}

impl MetadataClientConfig {
    /// Create a configuration for a single metadata endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, Error> {
        Self::with_endpoints([endpoint])
    }

    /// Create a configuration for an ordered list of mirror endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty or any URL is invalid.
    pub fn with_endpoints<I, S>(endpoints: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = Self {
            endpoints: endpoints.into_iter().map(Into::into).collect(),
            ..Self::default()
        };

        config.validated()
    }

    /// Set the number of attempt rounds.
    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Count non-2xx responses as endpoint failures.
    #[must_use]
    pub const fn with_fail_on_error_status(mut self, enabled: bool) -> Self {
        self.fail_on_error_status = enabled;
        self
    }

    /// Set the container poll interval in milliseconds.
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, millis: u64) -> Self {
        self.poll_interval_ms = millis;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the poll interval as a Duration.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Run field validation and check that every endpoint parses as a URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing the first problem found.
    pub fn validated(self) -> Result<Self, Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;
        self.parse_endpoints()?;
        Ok(self)
    }

    /// Parse every endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns an error if any endpoint cannot be parsed.
    pub fn parse_endpoints(&self) -> Result<Vec<Url>, Error> {
        self.endpoints
            .iter()
            .map(|endpoint| {
                Url::parse(endpoint).map_err(|e| {
                    Error::ConfigError(format!("Invalid metadata endpoint `{endpoint}`: {e}"))
                })
            })
            .collect()
    }
}

impl Default for MetadataClientConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            max_attempts: default_max_attempts(),
            request_timeout_secs: default_request_timeout_secs(),
            fail_on_error_status: false,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}
