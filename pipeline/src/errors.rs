//! Pipeline error type.

use thiserror::Error;

/// Errors an ingestion run can fail with. The worker converts any of these
/// into a `failed` job record; nothing escapes the job boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Collection produced nothing at all; an empty corpus is an error,
    /// not a no-op.
    #[error("no documents collected")]
    EmptyCorpus,

    /// Embedding service failure.
    #[error("embedding failed: {0}")]
    Embedding(#[from] llm_client::LlmClientError),

    /// Vector index failure.
    #[error("vector index failure: {0}")]
    Index(#[from] rag_store::IndexError),

    /// Chunk metadata could not be serialized for the index payload.
    #[error("metadata serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
