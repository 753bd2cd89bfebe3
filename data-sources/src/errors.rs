//! Collector error type.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors a single collector can fail with. The aggregator never propagates
/// these to its caller; they are logged and the collector is skipped.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Transport/HTTP client error.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-successful HTTP status from an upstream source.
    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { status: StatusCode, url: String },

    /// Unexpected/invalid payload from an upstream source.
    #[error("failed to decode source payload: {0}")]
    Decode(String),
}

/// Result alias for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;
