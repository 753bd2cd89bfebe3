//! RAG query orchestrator.
//!
//! One [`RagEngine::query`] call runs the full sequence: validate the
//! question, retrieve top-k context, build the grounded prompt (threading
//! caller-supplied history), call the model, and, when the model requests
//! corpus tools, execute them and issue exactly one follow-up call scoped
//! to the tool results. At most two model calls per query; no partial
//! answers on failure. The engine holds no per-query state, so identical
//! `(question, history, k)` inputs are independently reproducible modulo
//! model nondeterminism.

mod config;
mod error;
mod prompt;
mod tools;
mod types;

pub use config::EngineConfig;
pub use error::EngineError;
pub use prompt::REFUSAL_PHRASE;
pub use tools::CorpusTool;
pub use types::{ContextDoc, ConversationTurn, QaAnswer, TurnRole};

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use llm_client::{ChatMessage, ChatModel, TextEmbedder, ToolCallRequest};
use rag_store::{SearchHit, VectorIndex};

/// The query-side service object. Constructed once at startup with its
/// collaborators injected, then shared by reference across requests.
pub struct RagEngine {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn TextEmbedder>,
    chat: Arc<dyn ChatModel>,
    cfg: EngineConfig,
}

impl RagEngine {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn TextEmbedder>,
        chat: Arc<dyn ChatModel>,
        cfg: EngineConfig,
    ) -> Self {
        Self {
            index,
            embedder,
            chat,
            cfg,
        }
    }

    /// Default top-k used when the caller does not supply one.
    pub fn retrieval_k(&self) -> usize {
        self.cfg.retrieval_k
    }

    /// Retrieve the top-`k` most relevant chunks for a question.
    ///
    /// # Errors
    /// `EngineError::Validation` for a bad question, otherwise embedding or
    /// index failures.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<SearchHit>, EngineError> {
        self.validate_question(question)?;
        self.retrieve_unchecked(question, k).await
    }

    /// Answer a question from the indexed corpus.
    ///
    /// # Errors
    /// `EngineError::Validation` for bad input; LLM or index failures
    /// otherwise. Validation errors are user-facing, not system failures.
    #[instrument(skip_all, fields(history = history.len()))]
    pub async fn query(
        &self,
        question: &str,
        history: &[ConversationTurn],
        k: Option<usize>,
    ) -> Result<QaAnswer, EngineError> {
        self.validate_question(question)?;
        let k = k.unwrap_or(self.cfg.retrieval_k);

        info!("Processing query: {}...", truncate(question, 50));
        let hits = self.retrieve_unchecked(question, k).await?;
        debug!("Retrieved {} documents for context", hits.len());

        let context = prompt::format_context(&hits);
        let messages = vec![
            ChatMessage::system(prompt::build_system_prompt(&context, !history.is_empty())),
            ChatMessage::user(prompt::build_user_prompt(question, history)),
        ];

        let tool_specs = if self.cfg.enable_tools {
            CorpusTool::specs()
        } else {
            Vec::new()
        };

        let outcome = self.chat.chat(&messages, &tool_specs).await?;

        let answer = if outcome.tool_calls.is_empty() {
            outcome.content
        } else {
            self.answer_from_tools(question, history, &outcome.tool_calls)
                .await?
        };

        Ok(QaAnswer {
            answer,
            context: hits
                .into_iter()
                .map(|h| ContextDoc {
                    content: h.text,
                    metadata: h.metadata,
                })
                .collect(),
        })
    }

    /// Execute the requested tools and issue the single follow-up call
    /// constrained to their results.
    async fn answer_from_tools(
        &self,
        question: &str,
        history: &[ConversationTurn],
        calls: &[ToolCallRequest],
    ) -> Result<String, EngineError> {
        info!("Model requested {} tool call(s)", calls.len());

        let mut blocks = Vec::with_capacity(calls.len());
        for call in calls {
            let result = self.run_tool(call).await;
            blocks.push(format!("[{}]\n{}", call.name, result));
        }
        let tool_results = blocks.join("\n\n");

        let messages = vec![
            ChatMessage::system(prompt::build_tool_system_prompt(&tool_results)),
            ChatMessage::user(prompt::build_user_prompt(question, history)),
        ];

        // Final-answer call: no tools offered, so the loop cannot recurse.
        let outcome = self.chat.chat(&messages, &[]).await?;
        Ok(outcome.content)
    }

    /// Run one tool call. Failures (unknown names, malformed arguments,
    /// index errors) are folded into the result string so a bad tool call
    /// degrades the answer instead of aborting the query.
    async fn run_tool(&self, call: &ToolCallRequest) -> String {
        let tool = match CorpusTool::parse(call) {
            Ok(tool) => tool,
            Err(reason) => {
                warn!("Rejected tool call '{}': {reason}", call.name);
                return format!("error: {reason}");
            }
        };

        let outcome: Result<String, EngineError> = async {
            match tool {
                CorpusTool::CountDocuments => {
                    let count = self.index.count().await?;
                    Ok(format!("The knowledge base contains {count} documents."))
                }
                CorpusTool::ListChampions => {
                    let champions = self
                        .index
                        .distinct_values("champion", tools::LIST_LIMIT)
                        .await?;
                    if champions.is_empty() {
                        Ok("No champions found in the knowledge base.".to_string())
                    } else {
                        Ok(format!("Champions in the knowledge base: {}", champions.join(", ")))
                    }
                }
                CorpusTool::SearchCorpus { query, k } => {
                    let hits = self.retrieve_unchecked(&query, k).await?;
                    if hits.is_empty() {
                        Ok("No matching passages found.".to_string())
                    } else {
                        Ok(prompt::format_context(&hits))
                    }
                }
            }
        }
        .await;

        match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!("Tool '{}' failed: {e}", call.name);
                format!("error: tool '{}' failed: {e}", call.name)
            }
        }
    }

    async fn retrieve_unchecked(
        &self,
        question: &str,
        k: usize,
    ) -> Result<Vec<SearchHit>, EngineError> {
        let query = [question.to_string()];
        let mut vectors = self.embedder.embed_batch(&query).await?;
        let query_vector = vectors.pop().ok_or_else(|| {
            EngineError::Llm(llm_client::LlmClientError::Decode(
                "embedding service returned no vector for the query".into(),
            ))
        })?;
        Ok(self.index.search(&query_vector, k).await?)
    }

    fn validate_question(&self, question: &str) -> Result<(), EngineError> {
        let trimmed = question.trim();
        if trimmed.is_empty() {
            return Err(EngineError::Validation("question must not be empty".into()));
        }
        if trimmed.chars().count() < self.cfg.min_question_len {
            return Err(EngineError::Validation(format!(
                "question must be at least {} characters",
                self.cfg.min_question_len
            )));
        }
        Ok(())
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use llm_client::{ChatOutcome, LlmClientError, ToolSpec};
    use rag_store::{ChunkRecord, MemoryIndex};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Deterministic bag-of-words embedder, mirroring the pipeline test stub.
    struct HashEmbedder;

    fn hash_embed(text: &str) -> Vec<f32> {
        let mut v = vec![0f32; 64];
        for word in text.split_whitespace() {
            let mut h = DefaultHasher::new();
            word.to_lowercase().hash(&mut h);
            v[(h.finish() % 64) as usize] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }

    #[async_trait]
    impl TextEmbedder for HashEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmClientError> {
            Ok(texts.iter().map(|t| hash_embed(t)).collect())
        }
    }

    /// Grounded model stub: refuses when the context section is empty,
    /// otherwise echoes the grounded section of the system prompt. A queued
    /// script of tool calls makes it request tools on specific turns.
    struct StubChat {
        script: Mutex<VecDeque<Vec<ToolCallRequest>>>,
        log: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl StubChat {
        fn grounded() -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                log: Mutex::new(Vec::new()),
            }
        }

        fn with_tool_round(calls: Vec<ToolCallRequest>) -> Self {
            Self {
                script: Mutex::new(VecDeque::from([calls])),
                log: Mutex::new(Vec::new()),
            }
        }

        fn calls_made(&self) -> usize {
            self.log.lock().unwrap().len()
        }

        fn recorded(&self, call: usize) -> Vec<ChatMessage> {
            self.log.lock().unwrap()[call].clone()
        }
    }

    #[async_trait]
    impl ChatModel for StubChat {
        async fn chat(
            &self,
            messages: &[ChatMessage],
            _tools: &[ToolSpec],
        ) -> Result<ChatOutcome, LlmClientError> {
            self.log.lock().unwrap().push(messages.to_vec());

            if let Some(calls) = self.script.lock().unwrap().pop_front() {
                if !calls.is_empty() {
                    return Ok(ChatOutcome {
                        content: String::new(),
                        tool_calls: calls,
                    });
                }
            }

            // Extract the grounded section (context or tool results) from
            // the system prompt, the way a well-behaved model would.
            let system = &messages[0].content;
            let grounded = system
                .split_once("Context:\n")
                .or_else(|| system.split_once("Tool Results:\n"))
                .map(|(_, tail)| tail.trim())
                .unwrap_or("");

            let content = if grounded.is_empty() {
                REFUSAL_PHRASE.to_string()
            } else {
                grounded.to_string()
            };

            Ok(ChatOutcome {
                content,
                tool_calls: Vec::new(),
            })
        }
    }

    fn record(seed: &str, text: &str, champion: Option<&str>) -> ChunkRecord {
        ChunkRecord {
            id: Uuid::new_v5(&Uuid::NAMESPACE_URL, seed.as_bytes()),
            text: text.into(),
            metadata: match champion {
                Some(c) => json!({"type": "champion", "champion": c, "source": "sample"}),
                None => json!({"type": "game_mechanics", "source": "sample"}),
            },
            embedding: Some(hash_embed(text)),
        }
    }

    fn sample_records() -> Vec<ChunkRecord> {
        vec![
            record(
                "ahri",
                "Champion: Ahri\nRole: Mage/Assassin\nAbilities:\n\
                 - Q: Orb of Deception - deals magic damage.\n\
                 - W: Fox-Fire\n- E: Charm\n- R: Spirit Rush",
                Some("Ahri"),
            ),
            record(
                "yasuo",
                "Champion: Yasuo\nRole: Fighter/Assassin\nAbilities:\n\
                 - Q: Steel Tempest\n- W: Wind Wall\n- E: Sweeping Blade\n\
                 - R: Last Breath - Blinks to an airborne enemy champion.",
                Some("Yasuo"),
            ),
            record(
                "mechanics",
                "Laning Phase: farm minions. Objectives: Dragon, Baron Nashor. \
                 Vision Control: wards and sweepers.",
                None,
            ),
        ]
    }

    async fn engine_with(
        records: Vec<ChunkRecord>,
        chat: Arc<StubChat>,
        enable_tools: bool,
    ) -> RagEngine {
        let index = Arc::new(MemoryIndex::new());
        if !records.is_empty() {
            index.add(&records).await.unwrap();
        }
        RagEngine::new(
            index,
            Arc::new(HashEmbedder),
            chat,
            EngineConfig {
                enable_tools,
                ..EngineConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn empty_and_short_questions_are_validation_errors() {
        let engine = engine_with(vec![], Arc::new(StubChat::grounded()), false).await;

        let err = engine.query("   ", &[], None).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let err = engine.query("hi", &[], None).await.unwrap_err();
        match err {
            EngineError::Validation(msg) => assert!(msg.contains("at least 3 characters")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn retrieval_is_idempotent_for_fixed_index_state() {
        let chat = Arc::new(StubChat::grounded());
        let engine = engine_with(sample_records(), chat, false).await;

        let first = engine.retrieve("What are Ahri's abilities?", 3).await.unwrap();
        let second = engine.retrieve("What are Ahri's abilities?", 3).await.unwrap();
        let texts: Vec<_> = first.iter().map(|h| h.text.clone()).collect();
        let texts2: Vec<_> = second.iter().map(|h| h.text.clone()).collect();
        assert_eq!(texts, texts2);
        assert_eq!(first.len(), 3);
    }

    #[tokio::test]
    async fn grounding_refusal_on_empty_index() {
        let chat = Arc::new(StubChat::grounded());
        let engine = engine_with(vec![], chat, false).await;

        let qa = engine.query("What are Ahri's abilities?", &[], None).await.unwrap();
        assert!(qa.answer.contains(REFUSAL_PHRASE));
        assert!(qa.context.is_empty());
    }

    #[tokio::test]
    async fn ahri_question_is_answered_from_indexed_content() {
        let chat = Arc::new(StubChat::grounded());
        let engine = engine_with(sample_records(), chat.clone(), false).await;

        let qa = engine
            .query("What are Ahri's abilities?", &[], Some(10))
            .await
            .unwrap();
        assert!(qa.answer.contains("Ahri"));
        assert!(qa.answer.contains("Orb of Deception"));
        assert_eq!(chat.calls_made(), 1);
        assert_eq!(qa.context.len(), 3);
    }

    #[tokio::test]
    async fn history_is_threaded_into_the_prompt() {
        let chat = Arc::new(StubChat::grounded());
        let engine = engine_with(sample_records(), chat.clone(), false).await;

        let history = vec![
            ConversationTurn {
                role: TurnRole::User,
                content: "Who is Yasuo?".into(),
            },
            ConversationTurn {
                role: TurnRole::Assistant,
                content: "Yasuo is a swordsman champion.".into(),
            },
        ];

        let qa = engine
            .query("What is his ultimate called?", &history, Some(10))
            .await
            .unwrap();

        let messages = chat.recorded(0);
        assert!(messages[0].content.contains("conversation history"));
        assert!(messages[1].content.contains("User: Who is Yasuo?"));
        assert!(messages[1].content.contains("Assistant: Yasuo is a swordsman champion."));
        assert!(messages[1].content.contains("Current Question: What is his ultimate called?"));

        // The Yasuo document is in context, so the grounded answer names it.
        assert!(qa.answer.contains("Last Breath"));
    }

    #[tokio::test]
    async fn tool_round_folds_results_and_errors_into_second_call() {
        let chat = Arc::new(StubChat::with_tool_round(vec![
            ToolCallRequest {
                name: "count_documents".into(),
                args: json!({}),
            },
            ToolCallRequest {
                name: "list_champions".into(),
                args: json!({}),
            },
            ToolCallRequest {
                name: "make_coffee".into(),
                args: json!({}),
            },
        ]));
        let engine = engine_with(sample_records(), chat.clone(), true).await;

        let qa = engine.query("How many documents do you have?", &[], None).await.unwrap();

        // Exactly two model calls: the reasoning call and the final answer.
        assert_eq!(chat.calls_made(), 2);

        let followup = chat.recorded(1);
        assert!(followup[0].content.contains("Tool Results:"));
        assert!(followup[0].content.contains("[count_documents]"));
        assert!(followup[0].content.contains("3 documents"));
        assert!(followup[0].content.contains("Ahri, Yasuo"));
        assert!(followup[0].content.contains("error: unknown tool: make_coffee"));

        assert!(qa.answer.contains("3 documents"));
    }

    #[tokio::test]
    async fn search_tool_returns_matching_passages() {
        let chat = Arc::new(StubChat::with_tool_round(vec![ToolCallRequest {
            name: "search_corpus".into(),
            args: json!({"query": "wards and sweepers", "k": 1}),
        }]));
        let engine = engine_with(sample_records(), chat.clone(), true).await;

        let qa = engine.query("Tell me about vision control", &[], None).await.unwrap();
        assert_eq!(chat.calls_made(), 2);
        assert!(qa.answer.contains("Vision Control"));
    }

    #[tokio::test]
    async fn tools_disabled_means_single_call() {
        let chat = Arc::new(StubChat::grounded());
        let engine = engine_with(sample_records(), chat.clone(), false).await;
        engine.query("Tell me about the laning phase", &[], None).await.unwrap();
        assert_eq!(chat.calls_made(), 1);
    }
}
