//! Errors raised by record access, payload resolution and configuration

use thiserror::Error;

/// Result type alias for carton operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the carton system
#[derive(Error, Debug)]
pub enum Error {
    /// Row or remote resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Table store errors (connection, write, serialization inside the store)
    #[error("Table store error: {0}")]
    Store(String),

    /// A row, payload or response body was not valid JSON for its target
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport or non-2xx failure talking to the request authority
    #[error("HTTP error: {0}")]
    Http(String),

    /// Gateway rejected the account credentials (401/403)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Invalid or missing settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller passed an unusable argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stored field could not be decoded into its target shape
    #[error("Decode error in {field}: {message}")]
    Decode {
        /// Column the value came from
        field: String,
        /// Underlying reason
        message: String,
    },

    /// Anything else, including notifier failures
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Missing row or remote request
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a table store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a field decode error
    pub fn decode(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True if this error means the row or resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Lets `anyhow` contexts cross into library code
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
