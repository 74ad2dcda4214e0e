//! Error types for the cart API client.

use thiserror::Error;

/// Result type alias for cart API operations.
pub type Result<T> = std::result::Result<T, CartClientError>;

/// Errors that can occur while talking to the cart API.
#[derive(Debug, Error)]
pub enum CartClientError {
    /// HTTP client error (unreachable, timeout, broken body)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-2xx response from the API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid request (missing required data, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CartClientError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// HTTP status if the API answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the request never got an answer (connect, timeout).
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Http(err) => err.is_connect() || err.is_timeout(),
            _ => false,
        }
    }
}

impl From<CartClientError> for storefront_core::Error {
    fn from(err: CartClientError) -> Self {
        match err {
            CartClientError::InvalidRequest(message) => Self::invalid_input(message),
            other => Self::gateway(other.status_code(), other.to_string()),
        }
    }
}
