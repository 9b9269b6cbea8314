//! Common error types for PropFuse

use thiserror::Error;

/// Common result type for PropFuse operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across PropFuse crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input record or parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal processing error
    #[error("Internal error: {0}")]
    Internal(String),
}
