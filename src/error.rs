//! Error types for the position provider.

use thiserror::Error;

/// Main error type for provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0} must only be called through the transport")]
    OutOfBandCall(&'static str),

    #[error("GPS hardware interface is not available")]
    HardwareUnavailable,

    #[error("Hardware operation {operation} failed with error {code}")]
    Hardware { operation: &'static str, code: i32 },

    #[error("Failed to complete pending call: {0}")]
    CallCompletion(String),

    #[error("Provider service has stopped")]
    ServiceStopped,
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Config(e.to_string())
    }
}

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
