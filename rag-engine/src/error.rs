//! Typed error for the rag-engine crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad input from the caller (empty or too-short question). Reported
    /// back immediately, never retried, never logged as a system failure.
    #[error("{0}")]
    Validation(String),

    /// Errors from the LLM service (chat or query embedding).
    #[error("LLM service error: {0}")]
    Llm(#[from] llm_client::LlmClientError),

    /// Errors from the vector index.
    #[error("vector index error: {0}")]
    Index(#[from] rag_store::IndexError),
}
