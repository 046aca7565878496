//! Error types for Grand Drive.

use thiserror::Error;

/// Top-level error type for Grand Drive operations.
#[derive(Debug, Error)]
pub enum DriveError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File contents could not be parsed
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Shot type name not recognised
    #[error("Unknown shot type: {0}")]
    UnknownShotType(String),

    /// A value is outside of what the engine accepts
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Result type alias for Grand Drive operations.
pub type DriveResult<T> = Result<T, DriveError>;
