//! Error types for chatbridge

use thiserror::Error;

/// Result type alias using [`BridgeError`]
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Main error type for chatbridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// A complete response body could not be interpreted
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A streaming payload could not be decoded
    #[error("Stream decode error: {0}")]
    StreamDecode(String),

    /// A wire request could not be constructed
    #[error("Request build error: {0}")]
    Build(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BridgeError {
    /// Whether a caller-side retry with backoff is appropriate.
    ///
    /// Rate limiting and transient transport failures are retryable.
    /// Context-length, model-unavailable, and parameter-rejection responses
    /// are not: resending the same request cannot succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
