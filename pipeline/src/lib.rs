//! End-to-end ingestion pipeline: collect → chunk → embed → index.
//!
//! One [`IngestionPipeline::run`] call is one job. The index write runs in
//! one of three modes:
//! - **create**: the collection does not exist yet and is built from scratch
//!   (handled inside the index adapter)
//! - **force-refresh**: the collection is dropped first and rebuilt from the
//!   current chunk set
//! - **incremental append**: chunks are upserted into the existing
//!   collection; content-stable ids make re-ingesting unchanged text
//!   idempotent
//!
//! The worker loop that drives jobs off the queue lives in [`worker`].

pub mod chunker;
mod errors;
pub mod worker;

pub use chunker::{split_documents, split_text, DocChunk};
pub use errors::PipelineError;
pub use worker::{spawn_worker, WorkerHandle};

use std::sync::Arc;

use tracing::{info, instrument};

use data_sources::GameDataCollector;
use llm_client::TextEmbedder;
use rag_store::{ChunkRecord, VectorIndex};
use services::uuid::stable_uuid;

/// Name of the broker queue the API and the worker agree on.
pub const PIPELINE_QUEUE: &str = "pipeline_jobs";

/// Chunking knobs for the pipeline.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let dflt = Self::default();
        Self {
            chunk_size: parse_env("RAG_CHUNK_SIZE", dflt.chunk_size),
            chunk_overlap: parse_env("RAG_CHUNK_OVERLAP", dflt.chunk_overlap),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be > 0".into());
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err("chunk_overlap must be smaller than chunk_size".into());
        }
        Ok(())
    }
}

/// Counters reported by a successful run.
#[derive(Clone, Copy, Debug)]
pub struct PipelineOutcome {
    pub documents: u64,
    pub chunks: u64,
}

/// The ingestion orchestrator. Constructed once at startup and shared with
/// the worker; holds no mutable state of its own.
pub struct IngestionPipeline {
    collector: GameDataCollector,
    embedder: Arc<dyn TextEmbedder>,
    index: Arc<dyn VectorIndex>,
    cfg: PipelineConfig,
}

impl IngestionPipeline {
    pub fn new(
        collector: GameDataCollector,
        embedder: Arc<dyn TextEmbedder>,
        index: Arc<dyn VectorIndex>,
        cfg: PipelineConfig,
    ) -> Self {
        Self {
            collector,
            embedder,
            index,
            cfg,
        }
    }

    /// Run the full pipeline once.
    ///
    /// # Errors
    /// Fails on an empty corpus, embedding failure, or index write failure.
    /// Callers (the worker) convert errors into a `failed` job record.
    #[instrument(skip(self, sources))]
    pub async fn run(
        &self,
        sources: Option<&[String]>,
        force_refresh: bool,
    ) -> Result<PipelineOutcome, PipelineError> {
        info!("Starting data pipeline...");

        info!("Step 1: Collecting data...");
        let documents = self.collector.get_documents(sources).await;
        info!("Collected {} documents", documents.len());
        if documents.is_empty() {
            return Err(PipelineError::EmptyCorpus);
        }

        info!("Step 2: Chunking documents...");
        let chunks = split_documents(&documents, self.cfg.chunk_size, self.cfg.chunk_overlap);
        info!(
            "Created {} chunks from {} documents",
            chunks.len(),
            documents.len()
        );

        info!("Step 3: Embedding chunks...");
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        let mut records = Vec::with_capacity(chunks.len());
        for (chunk, embedding) in chunks.iter().zip(vectors) {
            records.push(ChunkRecord {
                id: stable_uuid(&format!("{}\n{}", chunk.metadata.source, chunk.text)),
                text: chunk.text.clone(),
                metadata: serde_json::to_value(&chunk.metadata)?,
                embedding: Some(embedding),
            });
        }

        info!("Step 4: Writing to the vector index...");
        if force_refresh {
            self.index.clear().await?;
            info!("Index dropped for full refresh");
        }
        let stored = self.index.add(&records).await?;
        info!("Stored {stored} chunks in the vector index");

        Ok(PipelineOutcome {
            documents: documents.len() as u64,
            chunks: records.len() as u64,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, dflt: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(dflt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use data_sources::{Collector, SampleDataCollector};
    use llm_client::LlmClientError;
    use rag_store::MemoryIndex;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    /// Deterministic bag-of-words embedder: word hashes bucketed into a
    /// small fixed-dimension vector, L2-normalized.
    pub(crate) struct HashEmbedder;

    pub(crate) fn hash_embed(text: &str) -> Vec<f32> {
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
    impl llm_client::TextEmbedder for HashEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmClientError> {
            Ok(texts.iter().map(|t| hash_embed(t)).collect())
        }
    }

    fn sample_pipeline(index: Arc<MemoryIndex>) -> IngestionPipeline {
        let collector =
            GameDataCollector::from_collectors(vec![Collector::Sample(SampleDataCollector)]);
        IngestionPipeline::new(
            collector,
            Arc::new(HashEmbedder),
            index,
            PipelineConfig {
                chunk_size: 400,
                chunk_overlap: 80,
            },
        )
    }

    #[tokio::test]
    async fn fresh_run_indexes_the_corpus() {
        let index = Arc::new(MemoryIndex::new());
        let pipeline = sample_pipeline(index.clone());

        let outcome = pipeline.run(None, false).await.unwrap();
        assert!(outcome.documents >= 1);
        assert!(outcome.chunks >= outcome.documents);
        assert_eq!(index.count().await.unwrap(), outcome.chunks);
    }

    #[tokio::test]
    async fn incremental_rerun_is_idempotent_for_unchanged_content() {
        let index = Arc::new(MemoryIndex::new());
        let pipeline = sample_pipeline(index.clone());

        let first = pipeline.run(None, false).await.unwrap();
        let second = pipeline.run(None, false).await.unwrap();
        assert_eq!(first.chunks, second.chunks);
        // Stable chunk ids: the second run upserted in place.
        assert_eq!(index.count().await.unwrap(), first.chunks);
    }

    #[tokio::test]
    async fn force_refresh_rebuilds_rather_than_accumulates() {
        let index = Arc::new(MemoryIndex::new());
        let pipeline = sample_pipeline(index.clone());

        let first = pipeline.run(None, true).await.unwrap();
        let second = pipeline.run(None, true).await.unwrap();
        assert_eq!(first.chunks, second.chunks);
        assert_eq!(index.count().await.unwrap(), second.chunks);
    }

    #[test]
    fn config_rejects_overlap_not_smaller_than_size() {
        let cfg = PipelineConfig {
            chunk_size: 100,
            chunk_overlap: 100,
        };
        assert!(cfg.validate().is_err());
        assert!(PipelineConfig::default().validate().is_ok());
    }
}
