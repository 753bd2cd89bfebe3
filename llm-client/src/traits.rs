//! Trait seams over the LLM service.
//!
//! `pipeline` and `rag-engine` depend on these traits rather than on the
//! concrete HTTP client, so tests can inject deterministic stubs.

use async_trait::async_trait;

use crate::errors::Result;
use crate::types::{ChatMessage, ChatOutcome, ToolSpec};

/// Chat completion backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a full message list and an optional tool catalogue, and return
    /// the assistant's reply (text and/or requested tool calls).
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatOutcome>;
}

/// Text embedding backend.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embed a batch of texts, one vector per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
