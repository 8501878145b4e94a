//! Error types shared across the SkyArchive services.

use thiserror::Error;

/// Main error type for request validation and configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    /// Malformed currency code.
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrency(String),

    /// Malformed country code.
    #[error("Invalid country code: {0:?}")]
    InvalidCountry(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl ArchiveError {
    /// Get error code for API error bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            ArchiveError::InvalidCurrency(_) => "INVALID_CURRENCY",
            ArchiveError::InvalidCountry(_) => "INVALID_COUNTRY",
            ArchiveError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Whether the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ArchiveError::ConfigurationError(_))
    }
}

/// Result type alias for shared operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;
