//! Runtime and collection configuration.

use crate::errors::IndexError;

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug)]
pub enum DistanceKind {
    /// Cosine distance (recommended for most embeddings).
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

/// Describes the vector space of the collection.
#[derive(Clone, Debug)]
pub struct VectorSpace {
    /// Dimensionality of vectors.
    pub size: usize,
    /// Distance function.
    pub distance: DistanceKind,
}

/// Configuration for the Qdrant-backed index.
#[derive(Clone, Debug)]
pub struct IndexConfig {
    /// Qdrant HTTP endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Distance function (Cosine by default).
    pub distance: DistanceKind,
    /// Upsert batch size (typical range: 128..512).
    pub upsert_batch: usize,
    /// Expected embedding dimensionality; `None` = inferred from data.
    pub embedding_dim: Option<usize>,
}

impl IndexConfig {
    /// Creates a sane default config for a given collection and endpoint.
    pub fn new_default(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            collection: collection.into(),
            distance: DistanceKind::Cosine,
            upsert_batch: 256,
            embedding_dim: None,
        }
    }

    /// Build from environment variables with the defaults above.
    pub fn from_env() -> Self {
        let mut cfg = Self::new_default(
            std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://127.0.0.1:6334".into()),
            std::env::var("QDRANT_COLLECTION").unwrap_or_else(|_| "lol_knowledge".into()),
        );
        cfg.qdrant_api_key = std::env::var("QDRANT_API_KEY").ok();
        if let Some(batch) = std::env::var("QDRANT_BATCH_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            cfg.upsert_batch = batch;
        }
        cfg.embedding_dim = std::env::var("EMBEDDING_DIM")
            .ok()
            .and_then(|s| s.parse().ok());
        cfg
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(IndexError::Config("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(IndexError::Config("collection is empty".into()));
        }
        if self.upsert_batch == 0 {
            return Err(IndexError::Config("upsert_batch must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let cfg = IndexConfig::new_default("http://127.0.0.1:6334", "lol_knowledge");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_collection_is_rejected() {
        let cfg = IndexConfig::new_default("http://127.0.0.1:6334", "  ");
        assert!(matches!(cfg.validate(), Err(IndexError::Config(_))));
    }
}
