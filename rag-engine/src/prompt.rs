//! Prompt builders: grounded system message, context block, history block.
//!
//! The grounding contract lives here and is the trustworthiness mechanism of
//! the whole system: the model is scoped strictly to the supplied context and
//! must produce the refusal phrase when the context lacks the answer. There
//! is no other citation-checking step downstream.

use rag_store::SearchHit;

use crate::types::{ConversationTurn, TurnRole};

/// The designated refusal phrase the model must emit when the context does
/// not contain the answer.
pub const REFUSAL_PHRASE: &str = "I don't have that information in my knowledge base";

/// Format retrieved chunks as a numbered context block, preserving retrieval
/// order (most-similar first). The order is the deterministic tie-break for
/// a fixed index state and question.
pub fn format_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| format!("[Source {}]\n{}", i + 1, hit.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Serialize history as alternating `User:`/`Assistant:` lines.
pub fn format_history(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(|t| match t.role {
            TurnRole::User => format!("User: {}", t.content),
            TurnRole::Assistant => format!("Assistant: {}", t.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// System message scoping the model to the retrieved context.
pub fn build_system_prompt(context: &str, with_history: bool) -> String {
    let history_rule = if with_history {
        "\n- Pay attention to the conversation history. If the user refers to something \
         mentioned earlier (like \"he\", \"she\", \"it\", \"this champion\", etc.), use the \
         conversation history to understand what they're referring to"
    } else {
        ""
    };

    format!(
        "You are a helpful assistant specialized in League of Legends game knowledge.\n\n\
         CRITICAL INSTRUCTIONS:\n\
         - You MUST ONLY use the information provided in the Context section below\n\
         - DO NOT use any information from your training data or general knowledge\n\
         - If the answer is not in the provided context, explicitly say \"{REFUSAL_PHRASE}\"\n\
         - The context provided is the most up-to-date and accurate information available\
         {history_rule}\n\n\
         Context:\n{context}"
    )
}

/// User message: the current question, preceded by serialized history when
/// the caller supplied any.
pub fn build_user_prompt(question: &str, history: &[ConversationTurn]) -> String {
    if history.is_empty() {
        question.trim().to_string()
    } else {
        format!(
            "Conversation History:\n{}\n\nCurrent Question: {}",
            format_history(history),
            question.trim()
        )
    }
}

/// System message for the follow-up call after tool dispatch: the same
/// grounding contract, scoped to the tool results instead.
pub fn build_tool_system_prompt(tool_results: &str) -> String {
    format!(
        "You are a helpful assistant specialized in League of Legends game knowledge.\n\n\
         CRITICAL INSTRUCTIONS:\n\
         - You MUST ONLY use the information in the Tool Results section below\n\
         - DO NOT use any information from your training data or general knowledge\n\
         - If the answer is not in the tool results, explicitly say \"{REFUSAL_PHRASE}\"\n\
         - A tool result may be an error message; in that case answer from the remaining results\n\n\
         Tool Results:\n{tool_results}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(text: &str) -> SearchHit {
        SearchHit {
            score: 1.0,
            text: text.into(),
            metadata: json!({}),
        }
    }

    #[test]
    fn context_block_is_numbered_in_order() {
        let block = format_context(&[hit("first"), hit("second")]);
        assert_eq!(block, "[Source 1]\nfirst\n\n[Source 2]\nsecond");
    }

    #[test]
    fn history_serializes_as_alternating_lines() {
        let turns = vec![
            ConversationTurn {
                role: TurnRole::User,
                content: "Who is Yasuo?".into(),
            },
            ConversationTurn {
                role: TurnRole::Assistant,
                content: "Yasuo is a swordsman champion.".into(),
            },
        ];
        assert_eq!(
            format_history(&turns),
            "User: Who is Yasuo?\nAssistant: Yasuo is a swordsman champion."
        );
    }

    #[test]
    fn system_prompt_carries_the_grounding_contract() {
        let prompt = build_system_prompt("[Source 1]\nsome text", false);
        assert!(prompt.contains("MUST ONLY use the information provided in the Context"));
        assert!(prompt.contains(REFUSAL_PHRASE));
        assert!(prompt.contains("[Source 1]\nsome text"));
        assert!(!prompt.contains("conversation history"));
    }

    #[test]
    fn history_rule_is_added_only_when_history_exists() {
        let with = build_system_prompt("ctx", true);
        assert!(with.contains("conversation history"));
    }
}
