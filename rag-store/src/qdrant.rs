//! Qdrant-backed implementation of [`VectorIndex`].
//!
//! Concentrates all Qdrant interactions behind a minimal API, hiding the
//! verbose builder pattern and keeping the rest of the application decoupled
//! from `qdrant-client`.

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, PointId, PointStruct, ScrollPointsBuilder,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QValue, VectorParamsBuilder, value,
};
use tracing::{debug, info, warn};

use crate::config::{DistanceKind, IndexConfig, VectorSpace};
use crate::errors::IndexError;
use crate::record::{ChunkRecord, SearchHit};
use crate::VectorIndex;

/// A facade over the Qdrant client implementing the index contract.
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
    distance: DistanceKind,
    upsert_batch: usize,
    embedding_dim: Option<usize>,
}

impl QdrantIndex {
    /// Creates a new index handle from the given configuration.
    pub fn new(cfg: &IndexConfig) -> Result<Self, IndexError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            distance: cfg.distance,
            upsert_batch: cfg.upsert_batch.max(1),
            embedding_dim: cfg.embedding_dim,
        })
    }

    /// Ensures that the collection exists in Qdrant.
    ///
    /// - If the collection already exists → no-op.
    /// - If missing → creates it with the given vector space configuration.
    async fn ensure_collection(&self, space: &VectorSpace) -> Result<(), IndexError> {
        match self.client.collection_info(&self.collection).await {
            Ok(_) => {
                debug!("Collection '{}' already exists", self.collection);
                return Ok(());
            }
            Err(err) => {
                warn!(
                    "Collection '{}' not found, will be created (error={})",
                    self.collection, err
                );
            }
        }

        let distance = match self.distance {
            DistanceKind::Cosine => qdrant_client::qdrant::Distance::Cosine,
            DistanceKind::Dot => qdrant_client::qdrant::Distance::Dot,
            DistanceKind::Euclid => qdrant_client::qdrant::Distance::Euclid,
        };

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(space.size as u64, distance)),
            )
            .await
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;

        info!("Collection '{}' created successfully", self.collection);
        Ok(())
    }

    /// Resolve the vector dimensionality for a batch of records.
    fn vector_size(&self, records: &[ChunkRecord]) -> Result<usize, IndexError> {
        if let Some(dim) = self.embedding_dim {
            return Ok(dim);
        }
        records
            .iter()
            .find_map(|r| r.embedding.as_ref())
            .map(|v| v.len())
            .ok_or_else(|| IndexError::Config("cannot infer embedding dimension".into()))
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn add(&self, records: &[ChunkRecord]) -> Result<u64, IndexError> {
        if records.is_empty() {
            debug!("No records provided for upsert");
            return Ok(0);
        }

        let size = self.vector_size(records)?;
        self.ensure_collection(&VectorSpace {
            size,
            distance: self.distance,
        })
        .await?;

        let mut total: u64 = 0;
        for batch in records.chunks(self.upsert_batch) {
            let points = build_points(batch, size)?;
            info!(
                "Upserting {} points into collection '{}'",
                points.len(),
                self.collection
            );
            self.client
                .upsert_points(UpsertPointsBuilder::new(&self.collection, points))
                .await
                .map_err(|e| IndexError::Qdrant(e.to_string()))?;
            total += batch.len() as u64;
        }

        Ok(total)
    }

    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError> {
        debug!(
            "Searching in '{}' with top_k={}",
            self.collection, k
        );

        let builder = SearchPointsBuilder::new(&self.collection, vector.to_vec(), k as u64)
            .with_payload(true);

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;

        let mut out = Vec::with_capacity(res.result.len());
        for r in res.result.into_iter() {
            let mut payload = qpayload_to_json(r.payload);
            let text = payload
                .as_object_mut()
                .and_then(|m| m.remove("text"))
                .and_then(|v| v.as_str().map(|s| s.to_string()))
                .unwrap_or_default();
            out.push(SearchHit {
                score: r.score,
                text,
                metadata: payload,
            });
        }

        debug!("Search completed: {} hits returned", out.len());
        Ok(out)
    }

    async fn count(&self) -> Result<u64, IndexError> {
        let res = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;
        Ok(res.result.map(|r| r.count).unwrap_or(0))
    }

    async fn clear(&self) -> Result<(), IndexError> {
        info!("Dropping collection '{}'", self.collection);
        match self.client.delete_collection(&self.collection).await {
            Ok(_) => Ok(()),
            // A missing collection is already "cleared".
            Err(e) => {
                warn!("delete_collection failed (treated as cleared): {e}");
                Ok(())
            }
        }
    }

    async fn distinct_values(&self, field: &str, limit: usize) -> Result<Vec<String>, IndexError> {
        let mut values: Vec<String> = Vec::new();
        let mut offset: Option<PointId> = None;

        loop {
            let mut builder = ScrollPointsBuilder::new(&self.collection)
                .limit(256)
                .with_payload(true);
            if let Some(off) = offset.take() {
                builder = builder.offset(off);
            }

            let page = self
                .client
                .scroll(builder)
                .await
                .map_err(|e| IndexError::Qdrant(e.to_string()))?;

            for point in &page.result {
                if let Some(QValue {
                    kind: Some(value::Kind::StringValue(s)),
                }) = point.payload.get(field)
                {
                    if !values.contains(s) {
                        values.push(s.clone());
                        if values.len() >= limit {
                            values.sort();
                            return Ok(values);
                        }
                    }
                }
            }

            match page.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        values.sort();
        Ok(values)
    }
}

/// Builds Qdrant points for a batch of records.
///
/// The payload is compact and flat: `text` plus the scalar metadata fields,
/// which round-trip cleanly through [`qpayload_to_json`].
fn build_points(batch: &[ChunkRecord], vector_size: usize) -> Result<Vec<PointStruct>, IndexError> {
    let mut pts = Vec::with_capacity(batch.len());

    for r in batch {
        let vector = r
            .embedding
            .clone()
            .ok_or_else(|| IndexError::MissingEmbedding { id: r.id.to_string() })?;
        if vector.len() != vector_size {
            return Err(IndexError::DimensionMismatch {
                got: vector.len(),
                want: vector_size,
            });
        }

        let mut payload: HashMap<String, QValue> = HashMap::new();
        payload.insert("text".into(), qstring(&r.text));
        if let Some(map) = r.metadata.as_object() {
            for (key, val) in map {
                payload.insert(key.clone(), json_to_qvalue(val));
            }
        }

        let pid: PointId = r.id.to_string().into();
        pts.push(PointStruct::new(pid, vector, payload));
    }

    Ok(pts)
}

/// Wraps a string into a Qdrant `Value`.
fn qstring(s: &str) -> QValue {
    QValue {
        kind: Some(value::Kind::StringValue(s.to_string())),
    }
}

/// Converts a scalar `serde_json::Value` into a Qdrant `Value`.
fn json_to_qvalue(v: &serde_json::Value) -> QValue {
    use value::Kind as K;
    let kind = match v {
        serde_json::Value::String(s) => Some(K::StringValue(s.clone())),
        serde_json::Value::Bool(b) => Some(K::BoolValue(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(K::IntegerValue(i))
            } else {
                n.as_f64().map(K::DoubleValue)
            }
        }
        _ => None,
    };
    QValue { kind }
}

/// Converts a Qdrant payload into JSON. Nested values are not produced by
/// [`build_points`], so only scalars need mapping back.
fn qpayload_to_json(mut p: HashMap<String, QValue>) -> serde_json::Value {
    use value::Kind as K;
    let mut m = serde_json::Map::new();
    for (k, v) in p.drain() {
        let j = match v.kind {
            Some(K::StringValue(s)) => serde_json::Value::String(s),
            Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
            Some(K::DoubleValue(f)) => serde_json::json!(f),
            Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
            _ => serde_json::Value::Null,
        };
        m.insert(k, j);
    }
    serde_json::Value::Object(m)
}
