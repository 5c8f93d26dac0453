//! KMB error types

use thiserror::Error;

/// Errors that can occur while talking to the KMB API
#[derive(Debug, Error)]
pub enum KmbError {
    /// Connection to the KMB service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The service answered with a non-success status
    #[error("Request failed: HTTP {status}")]
    RequestFailed {
        /// HTTP status code
        status: u16,
    },

    /// Failed to parse a response body
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimitExceeded {
        /// Seconds to wait before retrying (if provided by API)
        retry_after_secs: Option<u64>,
    },

    /// A URL or template is missing or malformed
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Request timeout
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },
}

impl KmbError {
    /// Returns true if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionFailed(_) | Self::Timeout { .. } | Self::RateLimitExceeded { .. } => {
                true
            },
            Self::RequestFailed { status } => *status >= 500,
            Self::ParseError(_) | Self::ConfigurationError(_) => false,
        }
    }

    /// Returns true if the error points at a deployment defect rather than the upstream
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigurationError(_))
    }
}
