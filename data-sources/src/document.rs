//! Uniform document record produced by every collector.

use serde::{Deserialize, Serialize};

/// Metadata attached to a collected document and inherited by its chunks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocMetadata {
    /// Document category, e.g. "champion", "game_mechanics", "items".
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Which collector produced the document, e.g. "sample", "data_dragon".
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub champion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A single collected document, immutable once created.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub metadata: DocMetadata,
}

impl Document {
    pub fn new(text: impl Into<String>, metadata: DocMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}
