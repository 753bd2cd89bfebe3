//! Vector index adapter: chunk storage and similarity retrieval.
//!
//! This crate provides the [`VectorIndex`] contract consumed by the ingestion
//! pipeline (write path) and the RAG engine (read path), with two
//! implementations:
//! - [`QdrantIndex`]: production, over `qdrant-client`
//! - [`MemoryIndex`]: in-process cosine index for local dev and tests

mod config;
mod errors;
mod memory;
mod qdrant;
mod record;

pub use config::{DistanceKind, IndexConfig, VectorSpace};
pub use errors::IndexError;
pub use memory::MemoryIndex;
pub use qdrant::QdrantIndex;
pub use record::{ChunkRecord, SearchHit};

use async_trait::async_trait;

/// Contract of a vector similarity index.
///
/// `add` is an upsert: records are keyed by their content-stable id, so
/// re-adding unchanged content replaces rather than duplicates. Readers may
/// run concurrently with `add`; `clear` must not run concurrently with
/// anything else against the same collection (caller responsibility).
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Upsert a batch of embedded chunk records. Returns the number stored.
    async fn add(&self, records: &[ChunkRecord]) -> Result<u64, IndexError>;

    /// Top-`k` most similar records for a query vector, best first.
    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError>;

    /// Number of stored records.
    async fn count(&self) -> Result<u64, IndexError>;

    /// Drop all stored records (force-refresh rebuilds from scratch).
    async fn clear(&self) -> Result<(), IndexError>;

    /// Distinct string values of a metadata field, sorted, capped at `limit`.
    async fn distinct_values(&self, field: &str, limit: usize) -> Result<Vec<String>, IndexError>;
}
