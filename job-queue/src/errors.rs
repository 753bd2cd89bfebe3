//! Error type for queue and status-store operations.

use thiserror::Error;

use crate::job::JobStatus;

/// Errors from the job queue crate.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Database errors (wrapped).
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    /// JSON (de)serialization of job payloads.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Attempted status regression; transitions are monotonic.
    #[error("invalid job status transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
}
