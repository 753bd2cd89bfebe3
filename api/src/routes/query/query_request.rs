//! Request/response DTOs for the query endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use rag_engine::ConversationTurn;

/// Body of `POST /query`.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    /// Prior turns, oldest first. The server never stores these.
    #[serde(default)]
    pub conversation_history: Option<Vec<ConversationTurn>>,
    /// Top-k override; also opts the response into including the context.
    #[serde(default)]
    pub k: Option<usize>,
}

/// One context document echoed back to the caller.
#[derive(Debug, Serialize)]
pub struct ContextItem {
    pub content: String,
    pub metadata: Value,
}

/// Response of `POST /query`.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<ContextItem>>,
}

/// Query-string parameters of `POST /retrieve`.
#[derive(Debug, Deserialize)]
pub struct RetrieveParams {
    pub question: String,
    #[serde(default)]
    pub k: Option<usize>,
}

/// Response of `POST /retrieve`.
#[derive(Debug, Serialize)]
pub struct RetrieveResponse {
    pub documents: Vec<ContextItem>,
}
