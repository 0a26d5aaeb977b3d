//! Error types for the LINE relay

use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the relay
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Messaging platform error (content fetch, reply)
    #[error("messaging error: {0}")]
    Messaging(String),

    /// Blob storage upload error
    #[error("storage error: {0}")]
    Storage(String),

    /// Completion API error
    #[error("inference error: {0}")]
    Inference(String),

    /// Record insert error
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Template file error
    #[error("template error: {0}")]
    Template(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
