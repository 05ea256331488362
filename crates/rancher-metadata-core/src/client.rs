//! HTTP client tuning for the metadata transport.
//!
//! The metadata service is local to the host, so defaults favour short timeouts
//! and a small connection pool over throughput.

use std::time::Duration;

/// Default timeout for metadata requests (in seconds)
pub const METADATA_DEFAULT_TIMEOUT: u64 = 5;

/// Default connect timeout for metadata requests (in seconds)
pub const METADATA_CONNECT_TIMEOUT: u64 = 2;

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 2;

/// Default maximum number of attempt rounds over the endpoint list
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay between container polls in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// HTTP client configuration.
///
/// Configures timeouts, connection pooling and compression for the
/// reqwest-backed transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Connection establishment timeout
    pub connect_timeout: Duration,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Enable response compression
    pub enable_compression: bool,
}

impl HttpConfig {
    /// Create a new HTTP configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_secs(METADATA_DEFAULT_TIMEOUT),
            connect_timeout: Duration::from_secs(METADATA_CONNECT_TIMEOUT),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_compression: true,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_new() {
        let config = HttpConfig::new();
        assert_eq!(config.timeout, Duration::from_secs(METADATA_DEFAULT_TIMEOUT));
        assert_eq!(
            config.connect_timeout,
            Duration::from_secs(METADATA_CONNECT_TIMEOUT)
        );
        assert_eq!(config.pool_max_idle_per_host, DEFAULT_POOL_MAX_IDLE_PER_HOST);
        assert!(config.enable_compression);
    }

    #[test]
    fn test_http_config_builder() {
        let config = HttpConfig::new()
            .with_timeout(Duration::from_secs(1))
            .with_connect_timeout(Duration::from_millis(250))
            .with_pool_idle_timeout(Duration::from_secs(30))
            .with_pool_max_idle(8)
            .with_compression(false);

        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(config.connect_timeout, Duration::from_millis(250));
        assert_eq!(config.pool_idle_timeout, Duration::from_secs(30));
        assert_eq!(config.pool_max_idle_per_host, 8);
        assert!(!config.enable_compression);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(HttpConfig::default(), HttpConfig::new());
        assert_eq!(DEFAULT_MAX_ATTEMPTS, 3);
        assert_eq!(DEFAULT_POLL_INTERVAL_MS, 500);
    }
}
