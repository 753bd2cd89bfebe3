//! In-process implementation of [`VectorIndex`] with cosine similarity.
//!
//! Useful for local development without a running Qdrant and as the index
//! used throughout the test suites. Semantics match the Qdrant
//! implementation: adding a record whose id already exists replaces it.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::IndexError;
use crate::record::{ChunkRecord, SearchHit};
use crate::VectorIndex;

/// In-memory vector index.
#[derive(Default)]
pub struct MemoryIndex {
    records: RwLock<Vec<ChunkRecord>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn add(&self, records: &[ChunkRecord]) -> Result<u64, IndexError> {
        let mut store = self.records.write().await;
        for record in records {
            if record.embedding.is_none() {
                return Err(IndexError::MissingEmbedding {
                    id: record.id.to_string(),
                });
            }
            match store.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record.clone(),
                None => store.push(record.clone()),
            }
        }
        Ok(records.len() as u64)
    }

    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError> {
        let store = self.records.read().await;

        let mut scored: Vec<(usize, f32, &ChunkRecord)> = store
            .iter()
            .enumerate()
            .filter_map(|(i, r)| {
                r.embedding
                    .as_ref()
                    .map(|e| (i, cosine_similarity(vector, e), r))
            })
            .collect();

        // Deterministic: score descending, insertion order breaks ties.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(_, score, r)| SearchHit {
                score,
                text: r.text.clone(),
                metadata: r.metadata.clone(),
            })
            .collect())
    }

    async fn count(&self) -> Result<u64, IndexError> {
        Ok(self.records.read().await.len() as u64)
    }

    async fn clear(&self) -> Result<(), IndexError> {
        self.records.write().await.clear();
        Ok(())
    }

    async fn distinct_values(&self, field: &str, limit: usize) -> Result<Vec<String>, IndexError> {
        let store = self.records.read().await;
        let mut values: Vec<String> = Vec::new();
        for r in store.iter() {
            if let Some(s) = r.metadata.get(field).and_then(|v| v.as_str()) {
                if !values.iter().any(|v| v == s) {
                    values.push(s.to_string());
                    if values.len() >= limit {
                        break;
                    }
                }
            }
        }
        values.sort();
        Ok(values)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn record(id_seed: &str, text: &str, champion: Option<&str>, embedding: Vec<f32>) -> ChunkRecord {
        ChunkRecord {
            id: Uuid::new_v5(&Uuid::NAMESPACE_URL, id_seed.as_bytes()),
            text: text.into(),
            metadata: match champion {
                Some(c) => json!({"type": "champion", "champion": c}),
                None => json!({"type": "misc"}),
            },
            embedding: Some(embedding),
        }
    }

    #[tokio::test]
    async fn add_with_same_id_replaces() {
        let idx = MemoryIndex::new();
        idx.add(&[record("a", "first", None, vec![1.0, 0.0])])
            .await
            .unwrap();
        idx.add(&[record("a", "second", None, vec![1.0, 0.0])])
            .await
            .unwrap();
        assert_eq!(idx.count().await.unwrap(), 1);
        let hits = idx.search(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(hits[0].text, "second");
    }

    #[tokio::test]
    async fn search_is_ordered_and_deterministic() {
        let idx = MemoryIndex::new();
        idx.add(&[
            record("a", "aligned", None, vec![1.0, 0.0]),
            record("b", "orthogonal", None, vec![0.0, 1.0]),
            record("c", "diagonal", None, vec![1.0, 1.0]),
        ])
        .await
        .unwrap();

        let first = idx.search(&[1.0, 0.0], 2).await.unwrap();
        let second = idx.search(&[1.0, 0.0], 2).await.unwrap();

        assert_eq!(first[0].text, "aligned");
        assert_eq!(first.len(), 2);
        let texts: Vec<_> = first.iter().map(|h| h.text.clone()).collect();
        let texts2: Vec<_> = second.iter().map(|h| h.text.clone()).collect();
        assert_eq!(texts, texts2);
    }

    #[tokio::test]
    async fn clear_empties_the_index() {
        let idx = MemoryIndex::new();
        idx.add(&[record("a", "x", None, vec![1.0])]).await.unwrap();
        idx.clear().await.unwrap();
        assert_eq!(idx.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn distinct_values_lists_unique_metadata() {
        let idx = MemoryIndex::new();
        idx.add(&[
            record("a", "x", Some("Ahri"), vec![1.0]),
            record("b", "y", Some("Yasuo"), vec![1.0]),
            record("c", "z", Some("Ahri"), vec![1.0]),
        ])
        .await
        .unwrap();
        let champs = idx.distinct_values("champion", 10).await.unwrap();
        assert_eq!(champs, vec!["Ahri".to_string(), "Yasuo".to_string()]);
    }

    #[tokio::test]
    async fn missing_embedding_is_rejected() {
        let idx = MemoryIndex::new();
        let mut r = record("a", "x", None, vec![1.0]);
        r.embedding = None;
        assert!(matches!(
            idx.add(&[r]).await,
            Err(IndexError::MissingEmbedding { .. })
        ));
    }
}
