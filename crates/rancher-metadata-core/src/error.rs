//! Error types for metadata operations.
//!
//! Per-endpoint transport failures are represented here as well as the fatal
//! outcomes surfaced to callers. A "not found" answer from the service is not an
//! error; see [`crate::types::MetadataResponse::Absent`].

use thiserror::Error;

/// Main error type for metadata operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Caller omitted an identifier the request shape requires
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Metadata endpoint refused or dropped the connection
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Request to a metadata endpoint timed out
    #[error("Timeout waiting for metadata endpoint: {0}")]
    Timeout(String),

    /// Any other HTTP-level failure talking to one endpoint
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Every endpoint failed on every attempt round
    #[error(
        "Failed to query metadata path `{path}` ({failures} failed requests over {attempts} attempts): {last_error}"
    )]
    QueryExhausted {
        /// Query path that could not be fetched
        path: String,
        /// Number of attempt rounds performed
        attempts: u32,
        /// Total number of failed requests
        failures: usize,
        /// Message of the last failure observed
        last_error: String,
    },

    /// Response could not be mapped onto the requested model
    #[error("Failed to decode metadata response: {0}")]
    DecodeError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Timeout(_) => "TIMEOUT",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::QueryExhausted { .. } => "QUERY_EXHAUSTED",
            Self::DecodeError(_) => "DECODE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// Returns true for failures scoped to a single endpoint request.
    ///
    /// The query executor swallows these and moves on to the next endpoint.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable(_) | Self::Timeout(_) | Self::HttpError(_)
        )
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodeError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exhausted() -> Error {
        Error::QueryExhausted {
            path: "/self/service".to_string(),
            attempts: 3,
            failures: 6,
            last_error: "connection refused".to_string(),
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::InvalidArgument("test".to_string()).error_code(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(
            Error::ServiceUnavailable("test".to_string()).error_code(),
            "SERVICE_UNAVAILABLE"
        );
        assert_eq!(Error::Timeout("test".to_string()).error_code(), "TIMEOUT");
        assert_eq!(
            Error::HttpError("test".to_string()).error_code(),
            "HTTP_ERROR"
        );
        assert_eq!(exhausted().error_code(), "QUERY_EXHAUSTED");
        assert_eq!(
            Error::DecodeError("test".to_string()).error_code(),
            "DECODE_ERROR"
        );
        assert_eq!(
            Error::ConfigError("test".to_string()).error_code(),
            "CONFIG_ERROR"
        );
        assert_eq!(
            Error::InvalidEndpoint("test".to_string()).error_code(),
            "INVALID_ENDPOINT"
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidArgument("missing service name".to_string());
        assert_eq!(err.to_string(), "Invalid argument: missing service name");

        assert_eq!(
            exhausted().to_string(),
            "Failed to query metadata path `/self/service` (6 failed requests over 3 attempts): connection refused"
        );
    }

    #[test]
    fn test_is_transport() {
        assert!(Error::ServiceUnavailable("test".to_string()).is_transport());
        assert!(Error::Timeout("test".to_string()).is_transport());
        assert!(Error::HttpError("test".to_string()).is_transport());

        assert!(!exhausted().is_transport());
        assert!(!Error::InvalidArgument("test".to_string()).is_transport());
        assert!(!Error::DecodeError("test".to_string()).is_transport());
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let metadata_err: Error = err.into();
        assert!(matches!(metadata_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let metadata_err: Error = err.into();
        assert!(matches!(metadata_err, Error::DecodeError(_)));
    }

    #[test]
    fn test_error_partial_eq() {
        let err1 = Error::InvalidArgument("test".to_string());
        let err2 = Error::InvalidArgument("test".to_string());
        let err3 = Error::InvalidArgument("other".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
        assert_eq!(exhausted(), exhausted().clone());
    }
}
