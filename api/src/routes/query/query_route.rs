//! POST /query: answer a question with RAG.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::query::query_request::{ContextItem, QueryRequest, QueryResponse},
};

/// Handler: POST /query
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/query \
///   -H 'content-type: application/json' \
///   -d '{"question":"What are Ahri'\''s abilities?","k":3}'
/// ```
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> AppResult<Json<QueryResponse>> {
    let history = request.conversation_history.unwrap_or_default();

    let qa = state
        .engine
        .query(&request.question, &history, request.k)
        .await?;

    // Context is echoed back only when the caller asked for an explicit k,
    // matching the polling cost to the caller's interest.
    let context = request.k.map(|_| {
        qa.context
            .into_iter()
            .map(|d| ContextItem {
                content: d.content,
                metadata: d.metadata,
            })
            .collect()
    });

    Ok(Json(QueryResponse {
        answer: qa.answer,
        context,
    }))
}
