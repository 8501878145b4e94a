//! FX error types.

use thiserror::Error;

/// Errors raised while talking to rate providers or converting amounts.
///
/// Provider errors are recovered inside the fetcher and only ever surface as
/// the `error` string of a fallback snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FxError {
    /// The provider did not answer within its timeout.
    #[error("{provider}: request timed out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },

    /// Connection or protocol failure before a response arrived.
    #[error("{provider}: request failed: {message}")]
    Transport { provider: String, message: String },

    /// Non-success HTTP status.
    #[error("{provider} {status}")]
    HttpStatus { provider: String, status: u16 },

    /// Body was not JSON or had no usable `rates` object.
    #[error("{provider}: {reason}")]
    Malformed { provider: String, reason: String },

    /// `rates` was present but held no finite positive number.
    #[error("provider {provider} returned no numeric rates")]
    NoNumericRates { provider: String },

    /// Rate unusable for conversion.
    #[error("Invalid conversion rate: {0}")]
    InvalidRate(f64),
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
