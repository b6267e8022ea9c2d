//! Error types for range-client

use thiserror::Error;

/// Failure talking to (or interpreting) the range server
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network or connection failure before a response was received
    #[error("Connection to {url} failed: {message}")]
    Connection { url: String, message: String },

    /// Server answered with something other than 200
    #[error("Got {status} response code from {url}")]
    BadStatus { status: u16, url: String },

    /// Server signalled a logical failure via the `RangeException` header
    #[error("Range server exception: {0}")]
    Server(String),

    /// Response body could not be read as text
    #[error("Invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    /// Split collapse never reached a fixed point
    #[error("Collapse did not converge after {iterations} iterations (last: {last_len} chars)")]
    CollapseDiverged { iterations: usize, last_len: usize },
}

impl TransportError {
    pub fn connection(url: impl Into<String>, message: impl ToString) -> Self {
        TransportError::Connection {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn bad_status(status: u16, url: impl Into<String>) -> Self {
        TransportError::BadStatus {
            status,
            url: url.into(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        TransportError::Server(message.into())
    }

    /// Short classification, useful as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Connection { .. } => "connection",
            TransportError::BadStatus { .. } => "bad_status",
            TransportError::Server(_) => "server",
            TransportError::InvalidResponse { .. } => "invalid_response",
            TransportError::CollapseDiverged { .. } => "collapse_diverged",
        }
    }
}

/// Result type alias for range-client operations
pub type Result<T> = std::result::Result<T, TransportError>;
