//! Corpus tools the model may call during a query.
//!
//! Dispatch is a closed enum: the model names a tool, [`CorpusTool::parse`]
//! maps the name to a variant, and unknown names are rejected
//! deterministically instead of being silently skipped.

use serde_json::json;

use llm_client::{ToolCallRequest, ToolSpec};

/// Default result count for `search_corpus` when the model omits `k`.
const SEARCH_DEFAULT_K: usize = 3;
/// Upper bound on listed champions.
pub(crate) const LIST_LIMIT: usize = 200;

/// A validated tool invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum CorpusTool {
    /// Total number of indexed chunks.
    CountDocuments,
    /// Distinct champion names present in the corpus.
    ListChampions,
    /// Free-text similarity search over the corpus.
    SearchCorpus { query: String, k: usize },
}

impl CorpusTool {
    /// The catalogue advertised to the model.
    pub fn specs() -> Vec<ToolSpec> {
        vec![
            ToolSpec {
                name: "count_documents",
                description: "Count the documents stored in the knowledge base.",
                parameters: json!({"type": "object", "properties": {}}),
            },
            ToolSpec {
                name: "list_champions",
                description: "List the champion names present in the knowledge base.",
                parameters: json!({"type": "object", "properties": {}}),
            },
            ToolSpec {
                name: "search_corpus",
                description: "Search the knowledge base for passages matching a free-text query.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": {"type": "string"},
                        "k": {"type": "integer", "minimum": 1}
                    },
                    "required": ["query"]
                }),
            },
        ]
    }

    /// Map a model tool call onto a variant. Unknown names and malformed
    /// arguments produce a deterministic error message that the orchestrator
    /// folds into the tool-results block.
    pub fn parse(call: &ToolCallRequest) -> Result<Self, String> {
        match call.name.as_str() {
            "count_documents" => Ok(CorpusTool::CountDocuments),
            "list_champions" => Ok(CorpusTool::ListChampions),
            "search_corpus" => {
                let query = call
                    .args
                    .get("query")
                    .and_then(|v| v.as_str())
                    .map(str::trim)
                    .filter(|q| !q.is_empty())
                    .ok_or_else(|| {
                        "search_corpus requires a non-empty string argument 'query'".to_string()
                    })?;
                let k = call
                    .args
                    .get("k")
                    .and_then(|v| v.as_u64())
                    .map(|k| k as usize)
                    .unwrap_or(SEARCH_DEFAULT_K)
                    .max(1);
                Ok(CorpusTool::SearchCorpus {
                    query: query.to_string(),
                    k,
                })
            }
            other => Err(format!("unknown tool: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: serde_json::Value) -> ToolCallRequest {
        ToolCallRequest {
            name: name.into(),
            args,
        }
    }

    #[test]
    fn known_names_map_to_variants() {
        assert_eq!(
            CorpusTool::parse(&call("count_documents", json!({}))).unwrap(),
            CorpusTool::CountDocuments
        );
        assert_eq!(
            CorpusTool::parse(&call("list_champions", json!(null))).unwrap(),
            CorpusTool::ListChampions
        );
        assert_eq!(
            CorpusTool::parse(&call("search_corpus", json!({"query": "ahri", "k": 5}))).unwrap(),
            CorpusTool::SearchCorpus {
                query: "ahri".into(),
                k: 5
            }
        );
    }

    #[test]
    fn search_defaults_k_when_omitted() {
        let tool = CorpusTool::parse(&call("search_corpus", json!({"query": "wards"}))).unwrap();
        assert_eq!(
            tool,
            CorpusTool::SearchCorpus {
                query: "wards".into(),
                k: SEARCH_DEFAULT_K
            }
        );
    }

    #[test]
    fn unknown_tool_is_rejected_deterministically() {
        let err = CorpusTool::parse(&call("drop_tables", json!({}))).unwrap_err();
        assert_eq!(err, "unknown tool: drop_tables");
    }

    #[test]
    fn search_without_query_is_rejected() {
        assert!(CorpusTool::parse(&call("search_corpus", json!({}))).is_err());
        assert!(CorpusTool::parse(&call("search_corpus", json!({"query": "  "}))).is_err());
    }

    #[test]
    fn spec_names_match_parser() {
        for spec in CorpusTool::specs() {
            let probe = call(spec.name, json!({"query": "x"}));
            assert!(CorpusTool::parse(&probe).is_ok(), "spec {} unparsable", spec.name);
        }
    }
}
