//! POST /retrieve: retrieval only, no generation.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::query::query_request::{ContextItem, RetrieveParams, RetrieveResponse},
};

/// Handler: POST /retrieve?question=...&k=...
pub async fn retrieve(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RetrieveParams>,
) -> AppResult<Json<RetrieveResponse>> {
    let k = params.k.unwrap_or_else(|| state.engine.retrieval_k());
    let hits = state.engine.retrieve(&params.question, k).await?;

    Ok(Json(RetrieveResponse {
        documents: hits
            .into_iter()
            .map(|h| ContextItem {
                content: h.text,
                metadata: h.metadata,
            })
            .collect(),
    }))
}
