//! Error types for the LLM service client.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced by [`LlmServiceClient`](crate::LlmServiceClient).
#[derive(Debug, Error)]
pub enum LlmClientError {
    /// Invalid endpoint (empty or missing http/https).
    #[error("[LLM Client] invalid service endpoint: {0}")]
    InvalidEndpoint(String),

    /// Transport/HTTP client error.
    #[error("[LLM Client] transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-successful HTTP status from the LLM service.
    #[error("[LLM Client] unexpected HTTP status {status} from {url}: {snippet}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: StatusCode,
        /// Request URL.
        url: String,
        /// Short snippet of the response body.
        snippet: String,
    },

    /// Unexpected/invalid JSON response.
    #[error("[LLM Client] failed to decode response: {0}")]
    Decode(String),
}

/// Result alias for LLM client operations.
pub type Result<T> = std::result::Result<T, LlmClientError>;
