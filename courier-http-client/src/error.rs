//! HTTP client error types.

use std::time::Duration;
use thiserror::Error;

/// Result type for HTTP client operations.
pub type Result<T> = std::result::Result<T, HttpClientError>;

/// HTTP client errors.
///
/// Transport-level failures (`Transport`, `Timeout`, `Connection`, `Http`)
/// come from the wrapped backend and are passed through untouched.
/// `MalformedRedirectTarget` is raised locally by the redirect decorator, so
/// callers can tell a misbehaving server from a misbehaving network.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// Generic transport failure reported by a backend.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timed out.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A redirect-status response carried no usable `Location`.
    #[error("Malformed redirect target on {status} response (location: {location:?}): {reason}")]
    MalformedRedirectTarget {
        /// Status code of the redirect response.
        status: u16,
        /// Raw `Location` header value, if one was present.
        location: Option<String>,
        /// Why the location could not be used.
        reason: String,
    },

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request building error.
    #[error("Failed to build request: {0}")]
    RequestBuild(String),

    /// Response error.
    #[error("Response error: {status} - {message}")]
    Response {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Response body could not be decoded as text.
    #[error("Failed to decode response body: {0}")]
    Decode(String),

    /// Underlying HTTP client error.
    #[cfg(feature = "reqwest")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpClientError {
    /// Create a malformed redirect error.
    pub fn malformed_redirect(
        status: u16,
        location: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedRedirectTarget {
            status,
            location,
            reason: reason.into(),
        }
    }

    /// Check if this error originated in the transport rather than locally.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) | Self::Connection(_) | Self::Io(_) => true,
            #[cfg(feature = "reqwest")]
            Self::Http(_) => true,
            _ => false,
        }
    }

    /// Check if this is a malformed redirect target error.
    pub fn is_malformed_redirect(&self) -> bool {
        matches!(self, Self::MalformedRedirectTarget { .. })
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            #[cfg(feature = "reqwest")]
            Self::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Check if this is a connection error.
    pub fn is_connection(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            #[cfg(feature = "reqwest")]
            Self::Http(e) => e.is_connect(),
            _ => false,
        }
    }

    /// Get the HTTP status code if this error is tied to a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            Self::MalformedRedirectTarget { status, .. } => Some(*status),
            #[cfg(feature = "reqwest")]
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
