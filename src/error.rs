//! Error types for fileshare.

use thiserror::Error;

/// Common error type for fileshare.
#[derive(Error, Debug)]
pub enum FileshareError {
    /// No metadata record exists for the given file ID.
    #[error("file {0} not found")]
    NotFound(i64),

    /// I/O failure while writing, reading, or removing a stored file.
    ///
    /// This also covers a stored file that is missing even though its
    /// metadata record is present.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The metadata repository itself failed.
    ///
    /// Errors from sqlx are automatically converted.
    #[error("metadata error: {0}")]
    Metadata(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for FileshareError {
    fn from(e: sqlx::Error) -> Self {
        FileshareError::Metadata(e.to_string())
    }
}

/// Result type alias for fileshare operations.
pub type Result<T> = std::result::Result<T, FileshareError>;
