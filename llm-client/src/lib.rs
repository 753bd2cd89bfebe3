//! Thin async client for the LLM microservice.
//!
//! The service exposes two endpoints consumed here:
//! - `POST {base}/chat`: chat completion; may return `tool_calls`
//! - `POST {base}/embeddings`: batched text embeddings
//!
//! The client keeps two `reqwest::Client`s because the two calls have very
//! different latency profiles: interactive chat uses a short timeout while
//! embedding batches are allowed to run for minutes.

mod errors;
mod traits;
mod types;

pub use errors::{LlmClientError, Result};
pub use traits::{ChatModel, TextEmbedder};
pub use types::{ChatMessage, ChatOutcome, ChatRole, ToolCallRequest, ToolSpec};

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Configuration for [`LlmServiceClient`].
#[derive(Clone, Debug)]
pub struct LlmServiceConfig {
    /// Base URL of the LLM service, e.g. `http://llm-service:8000`.
    pub base_url: String,
    /// Timeout for chat completions, seconds.
    pub chat_timeout_secs: u64,
    /// Timeout for one embedding batch, seconds.
    pub embed_timeout_secs: u64,
    /// Texts per embedding request.
    pub embed_batch_size: usize,
}

impl LlmServiceConfig {
    /// Build from environment variables with the service defaults.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("LLM_SERVICE_URL")
                .unwrap_or_else(|_| "http://llm-service:8000".into()),
            chat_timeout_secs: parse_env("LLM_CHAT_TIMEOUT_SECS", 60),
            embed_timeout_secs: parse_env("LLM_EMBED_TIMEOUT_SECS", 300),
            embed_batch_size: parse_env("LLM_EMBED_BATCH_SIZE", 100),
        }
    }
}

/// HTTP client for the LLM service.
pub struct LlmServiceClient {
    chat_http: reqwest::Client,
    embed_http: reqwest::Client,
    url_chat: String,
    url_embeddings: String,
    embed_batch_size: usize,
}

impl LlmServiceClient {
    /// Creates a new client from the given config.
    ///
    /// # Errors
    /// - [`LlmClientError::InvalidEndpoint`] if `cfg.base_url` is invalid
    /// - [`LlmClientError::Transport`] if an HTTP client cannot be built
    pub fn new(cfg: LlmServiceConfig) -> Result<Self> {
        let endpoint = cfg.base_url.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(LlmClientError::InvalidEndpoint(cfg.base_url));
        }

        let chat_http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.chat_timeout_secs))
            .build()?;
        let embed_http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.embed_timeout_secs))
            .build()?;

        let base = endpoint.trim_end_matches('/').to_string();

        Ok(Self {
            chat_http,
            embed_http,
            url_chat: format!("{}/chat", base),
            url_embeddings: format!("{}/embeddings", base),
            embed_batch_size: cfg.embed_batch_size.max(1),
        })
    }

    /// Performs one chat completion request.
    ///
    /// # Errors
    /// - [`LlmClientError::HttpStatus`] for non-2xx responses
    /// - [`LlmClientError::Transport`] for client errors
    /// - [`LlmClientError::Decode`] if the response cannot be parsed
    #[instrument(skip_all, fields(messages = messages.len(), tools = tools.len()))]
    async fn chat_once(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatOutcome> {
        let body = ChatRequest {
            messages,
            tools: if tools.is_empty() { None } else { Some(tools) },
        };

        debug!("POST {}", self.url_chat);
        let resp = self.chat_http.post(&self.url_chat).json(&body).send().await?;

        if !resp.status().is_success() {
            return Err(status_error(&self.url_chat, resp).await);
        }

        let out: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmClientError::Decode(format!("serde error: {e}")))?;

        Ok(ChatOutcome {
            content: out.content,
            tool_calls: out.tool_calls.unwrap_or_default(),
        })
    }

    /// Embeds one batch of texts (no internal batching).
    async fn embed_once(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = EmbeddingsRequest { texts };

        debug!("POST {} ({} texts)", self.url_embeddings, texts.len());
        let resp = self
            .embed_http
            .post(&self.url_embeddings)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(status_error(&self.url_embeddings, resp).await);
        }

        let out: EmbeddingsResponse = resp
            .json()
            .await
            .map_err(|e| LlmClientError::Decode(format!("serde error: {e}")))?;

        if out.embeddings.len() != texts.len() {
            return Err(LlmClientError::Decode(format!(
                "embedding count mismatch: sent {} texts, got {} vectors",
                texts.len(),
                out.embeddings.len()
            )));
        }

        Ok(out.embeddings)
    }
}

#[async_trait]
impl ChatModel for LlmServiceClient {
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatOutcome> {
        self.chat_once(messages, tools).await
    }
}

#[async_trait]
impl TextEmbedder for LlmServiceClient {
    /// Splits the input into batches to bound request size; one transient
    /// transport failure per batch is retried before giving up.
    #[instrument(skip_all, fields(texts = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut all = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.embed_batch_size) {
            let vectors = match self.embed_once(batch).await {
                Ok(v) => v,
                Err(LlmClientError::Transport(e)) => {
                    debug!("embedding batch failed ({e}), retrying once");
                    self.embed_once(batch).await?
                }
                Err(e) => return Err(e),
            };
            all.extend(vectors);
        }
        Ok(all)
    }
}

/// Builds an [`LlmClientError::HttpStatus`] from a failed response.
async fn status_error(url: &str, resp: reqwest::Response) -> LlmClientError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let snippet = text.chars().take(240).collect::<String>();
    LlmClientError::HttpStatus {
        status,
        url: url.to_string(),
        snippet,
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, dflt: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(dflt)
}

/* ==========================
HTTP payloads
========================== */

/// Request body for `POST /chat`.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSpec]>,
}

/// Response body for `POST /chat`.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    content: String,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallRequest>>,
}

/// Request body for `POST /embeddings`.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    texts: &'a [String],
}

/// Response body for `POST /embeddings`.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embeddings: Vec<Vec<f32>>,
}
