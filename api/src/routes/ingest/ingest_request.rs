//! Request/response DTOs for the ingestion endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use job_queue::JobStatus;

/// Body of `POST /ingest`. Every field is optional; an empty body means
/// "all sources, no refresh".
#[derive(Debug, Default, Deserialize)]
pub struct IngestRequest {
    /// Restrict collection to these source names (e.g. `["DataDragon"]`).
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    /// Drop the index and rebuild it from the freshly collected corpus.
    #[serde(default)]
    pub force_refresh: Option<bool>,
}

/// Response of `POST /ingest`.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub message: &'static str,
}
