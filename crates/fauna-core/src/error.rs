//! Error types for the FaunaDB driver
//!
//! Every fallible operation in the workspace returns [`Error`], so failures
//! raised by an injected executor reach the caller unchanged.

use thiserror::Error;

/// The main error type for driver operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ========== Value Model Errors ==========
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    // ========== Wire Format Errors ==========
    #[error("Format error: {0}")]
    Format(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // ========== Query Errors ==========
    #[error("Query execution error: {code}: {description}")]
    QueryExecution { code: String, description: String },

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Query timeout")]
    Timeout,

    // ========== Configuration Errors ==========
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for driver operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a [`Error::Format`] error
    pub fn format(message: impl Into<String>) -> Self {
        Error::Format(message.into())
    }

    /// Returns true if repeating the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Unavailable(_) | Error::Timeout)
    }

    /// Returns true if this error signals malformed wire data
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_) | Error::Serialization(_))
    }
}
