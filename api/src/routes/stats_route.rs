//! GET /stats: vector index statistics.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::{core::app_state::AppState, error_handler::AppResult};

#[derive(Serialize)]
pub struct StatsResponse {
    pub total_chunks: u64,
    pub collection: String,
    pub retrieval_k: usize,
}

pub async fn stats(State(state): State<Arc<AppState>>) -> AppResult<Json<StatsResponse>> {
    let total_chunks = state.index.count().await?;
    Ok(Json(StatsResponse {
        total_chunks,
        collection: state.collection.clone(),
        retrieval_k: state.engine.retrieval_k(),
    }))
}
