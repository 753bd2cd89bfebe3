//! Core data models used by the index implementations.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Canonical chunk record stored in the index.
///
/// The id is content-stable (UUIDv5 of source + text), so re-adding an
/// unchanged chunk upserts the same point instead of duplicating it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: Uuid,
    pub text: String,
    /// Flat metadata object inherited from the parent document.
    pub metadata: Value,
    pub embedding: Option<Vec<f32>>,
}

/// A single retrieval hit, most-similar first in search results.
#[derive(Clone, Debug, Serialize)]
pub struct SearchHit {
    pub score: f32,
    pub text: String,
    pub metadata: Value,
}
