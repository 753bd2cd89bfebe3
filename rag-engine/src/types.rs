//! Public API types re-used by the HTTP layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who said a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One turn of caller-supplied conversation history. The engine never
/// persists these; statelessness per query is a deliberate invariant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

/// A context document returned alongside the answer.
#[derive(Clone, Debug, Serialize)]
pub struct ContextDoc {
    pub content: String,
    pub metadata: Value,
}

/// Final answer together with the context that was fed to the model.
#[derive(Clone, Debug)]
pub struct QaAnswer {
    pub answer: String,
    pub context: Vec<ContextDoc>,
}
