//! Error types for patients-core

use thiserror::Error;

/// Result type alias using patients-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in patients-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A record with the same code already exists
    #[error("Patient code already exists: {0}")]
    DuplicateKey(String),

    /// Record not found
    #[error("Patient not found: {0}")]
    NotFound(String),

    /// Durable storage could not be read or written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Stored content could not be decoded
    #[error("Stored data is corrupt: {0}")]
    Deserialization(String),

    /// No remote auth token configured
    #[error("Remote sync is not configured: missing auth token")]
    MissingCredentials,

    /// Remote configuration is present but unusable
    #[error("Invalid remote configuration: {0}")]
    InvalidConfiguration(String),

    /// Remote metadata read failed
    #[error("Remote read failed: {0}")]
    RemoteRead(String),

    /// Remote snapshot write was rejected
    #[error("Remote write failed: {0}")]
    RemoteWrite(String),

    /// Import document is not a valid record array
    #[error("Import failed: {0}")]
    ImportParse(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
