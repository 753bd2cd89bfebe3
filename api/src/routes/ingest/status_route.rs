//! GET /status/{job_id}: job status polling.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use job_queue::PipelineJob;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
};

pub async fn job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<PipelineJob>> {
    match state.queue.get_job(job_id).await? {
        Some(job) => Ok(Json(job)),
        None => Err(AppError::NotFound),
    }
}
