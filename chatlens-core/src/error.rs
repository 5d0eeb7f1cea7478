//! Error types for chatlens-core

use thiserror::Error;

/// Main error type for the chatlens-core library
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite error from the message or contact database
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Contact export failed (permission denied, tool missing, bad output)
    #[error("contact export error: {0}")]
    Contacts(String),

    /// Message source failed outside of SQLite itself
    #[error("message source error: {0}")]
    Source(String),
}

/// Result type alias for chatlens-core
pub type Result<T> = std::result::Result<T, Error>;
