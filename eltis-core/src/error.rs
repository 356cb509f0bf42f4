//! Error types for the ELTIS door system

use thiserror::Error;

/// Core error type for door operations
#[derive(Error, Debug)]
pub enum EltisError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serial link errors (open, write, read)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid input or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// No serial device matched the configured path or pattern
    #[error("Device interface not found")]
    DeviceNotFound,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl EltisError {
    /// Whether this error came from the transport (open, write, read or timeout).
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            EltisError::Connection(_) | EltisError::Timeout(_) | EltisError::Io(_)
        )
    }
}

/// Result type alias for door operations
pub type Result<T> = std::result::Result<T, EltisError>;

impl From<serde_json::Error> for EltisError {
    fn from(err: serde_json::Error) -> Self {
        EltisError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for EltisError {
    fn from(err: toml::de::Error) -> Self {
        EltisError::Config(err.to_string())
    }
}
