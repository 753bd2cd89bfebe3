//! POST /ingest: queue an ingestion job.
//!
//! Ingestion is always asynchronous: the handler creates the status record,
//! pushes the job onto the broker, and returns immediately with the job id.
//! Progress is visible only through `GET /status/{job_id}`.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use tracing::info;

use job_queue::{JobRequest, JobStatus};
use services::uuid::new_job_id;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::ingest::ingest_request::{IngestRequest, IngestResponse},
};

/// Handler: POST /ingest
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/ingest \
///   -H 'content-type: application/json' \
///   -d '{"force_refresh": true}'
/// ```
pub async fn ingest_data(
    State(state): State<Arc<AppState>>,
    body: Option<Json<IngestRequest>>,
) -> AppResult<Json<IngestResponse>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let job_id = new_job_id();
    state.queue.create_job(job_id, "Job queued").await?;

    let queued = state
        .queue
        .enqueue(
            state.queue_name,
            &JobRequest {
                job_id,
                sources: request.sources,
                force_refresh: request.force_refresh.unwrap_or(false),
            },
        )
        .await;

    if !queued {
        // The job row must not silently stay `queued` forever.
        state
            .queue
            .update_job(
                job_id,
                JobStatus::Failed,
                "Failed to enqueue job",
                None,
                Some("queue unavailable"),
            )
            .await?;
        return Err(AppError::Http {
            status: StatusCode::SERVICE_UNAVAILABLE,
            code: "QUEUE_UNAVAILABLE",
            message: "Failed to queue job. Queue may be unavailable.".into(),
        });
    }

    info!("Job {job_id} queued successfully");

    Ok(Json(IngestResponse {
        job_id,
        status: JobStatus::Queued,
        message: "Pipeline job queued successfully",
    }))
}
