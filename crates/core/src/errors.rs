//! Error types shared by the cart crates.

use thiserror::Error;

/// Result type alias for cart operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the cart core and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// Durable storage failed (quota, disabled backend, I/O).
    #[error("Storage error: {0}")]
    Storage(String),

    /// The remote cart service could not be reached or rejected the call.
    #[error("Gateway error{}: {message}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Gateway {
        status: Option<u16>,
        message: String,
    },

    /// Caller supplied data the cart cannot accept.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a gateway error, optionally carrying the HTTP status.
    pub fn gateway(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Gateway {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// HTTP status if the remote service answered with one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Gateway { status, .. } => *status,
            _ => None,
        }
    }

    /// True for failures talking to the remote cart (unreachable or non-2xx).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Gateway { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_error_display_includes_status_when_present() {
        let err = Error::gateway(Some(503), "service unavailable");
        assert_eq!(err.to_string(), "Gateway error (503): service unavailable");
        assert_eq!(err.status_code(), Some(503));

        let err = Error::gateway(None, "connection refused");
        assert_eq!(err.to_string(), "Gateway error: connection refused");
        assert!(err.is_transport());
    }

    #[test]
    fn storage_error_is_not_transport() {
        let err = Error::storage("quota exceeded");
        assert!(!err.is_transport());
        assert_eq!(err.status_code(), None);
    }
}
