//! Error types for folio.

use thiserror::Error;

/// Result type alias using folio's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for folio operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Content file or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored content could not be parsed (malformed JSON or wrong top-level shape)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Submitted content failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or invalid admin session
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Write rejected because the document changed since it was read
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl Error {
    /// True when the error wraps a missing file.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
