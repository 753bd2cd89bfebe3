//! Engine configuration loaded from environment variables.

/// Knobs for retrieval and prompting.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Default top-k when the caller does not supply one.
    pub retrieval_k: usize,
    /// Minimum accepted question length (after trimming).
    pub min_question_len: usize,
    /// Whether the model is offered the corpus tools.
    pub enable_tools: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retrieval_k: 3,
            min_question_len: 3,
            enable_tools: true,
        }
    }
}

impl EngineConfig {
    /// Build from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        let dflt = Self::default();
        Self {
            retrieval_k: parse("RAG_RETRIEVAL_K", dflt.retrieval_k),
            min_question_len: parse("RAG_MIN_QUESTION_LEN", dflt.min_question_len),
            enable_tools: std::env::var("RAG_ENABLE_TOOLS")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(dflt.enable_tools),
        }
    }
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(dflt)
}
