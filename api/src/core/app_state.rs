//! Shared state for all HTTP handlers.
//!
//! Built once in `start()` from explicitly constructed components and passed
//! to handlers via axum's `State`; no module-level singletons.

use std::sync::Arc;

use job_queue::JobQueue;
use rag_engine::RagEngine;
use rag_store::VectorIndex;

/// Dependency bundle shared by the request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Query-side orchestrator.
    pub engine: Arc<RagEngine>,
    /// Broker + job status store.
    pub queue: JobQueue,
    /// Vector index, used directly by `/stats`.
    pub index: Arc<dyn VectorIndex>,
    /// Broker queue the worker consumes.
    pub queue_name: &'static str,
    /// Collection name reported by `/stats`.
    pub collection: String,
}
