//! HTTP API for the League of Legends Q&A backend.
//!
//! `start()` wires every component explicitly (LLM client, vector index,
//! job queue, collectors, pipeline, RAG engine), spawns the supervised
//! ingestion worker, and serves the axum router until ctrl-c. Handlers get
//! their dependencies through [`core::app_state::AppState`]; there is no
//! global state.

use std::{env, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use colored::Colorize;
use tokio::signal;
use tracing::info;

pub mod core;
pub mod error_handler;
mod routes;

use data_sources::{GameDataCollector, SourcesConfig};
use error_handler::AppError;
use job_queue::{JobQueue, QueueConfig};
use llm_client::{ChatModel, LlmServiceClient, LlmServiceConfig, TextEmbedder};
use pipeline::{IngestionPipeline, PIPELINE_QUEUE, PipelineConfig, spawn_worker};
use rag_engine::{EngineConfig, RagEngine};
use rag_store::{IndexConfig, MemoryIndex, QdrantIndex, VectorIndex};

use crate::core::app_state::AppState;
use crate::routes::{
    health_route::health_check,
    ingest::{ingest_route::ingest_data, status_route::job_status},
    query::{query_route::query, retrieve_route::retrieve},
    stats_route::stats,
};

pub const SERVICE_NAME: &str = "lol-qa-backend";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the application router over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ingest", post(ingest_data))
        .route("/status/{job_id}", get(job_status))
        .route("/query", post(query))
        .route("/retrieve", post(retrieve))
        .route("/stats", get(stats))
        .with_state(state)
}

/// Construct every component, start the worker, and serve until shutdown.
pub async fn start() -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8000".into());

    // LLM service client doubles as chat model and embedder.
    let llm = Arc::new(
        LlmServiceClient::new(LlmServiceConfig::from_env())
            .map_err(|e| AppError::Startup(e.to_string()))?,
    );
    let chat: Arc<dyn ChatModel> = llm.clone();
    let embedder: Arc<dyn TextEmbedder> = llm;

    // Vector index: Qdrant in production, in-memory for local development.
    let index_cfg = IndexConfig::from_env();
    let index: Arc<dyn VectorIndex> = match env::var("VECTOR_BACKEND").as_deref() {
        Ok("memory") => {
            info!("Using in-memory vector index (VECTOR_BACKEND=memory)");
            Arc::new(MemoryIndex::new())
        }
        _ => Arc::new(QdrantIndex::new(&index_cfg).map_err(|e| AppError::Startup(e.to_string()))?),
    };

    let queue = JobQueue::connect(&QueueConfig::from_env())
        .await
        .map_err(|e| AppError::Startup(e.to_string()))?;

    let pipeline_cfg = PipelineConfig::from_env();
    pipeline_cfg.validate().map_err(AppError::Startup)?;
    let collector = GameDataCollector::from_config(&SourcesConfig::from_env());
    let ingestion = Arc::new(IngestionPipeline::new(
        collector,
        embedder.clone(),
        index.clone(),
        pipeline_cfg,
    ));

    let engine = Arc::new(RagEngine::new(
        index.clone(),
        embedder,
        chat,
        EngineConfig::from_env(),
    ));

    // The worker is a first-class supervised task, independent of any
    // request; stopped explicitly after the server drains.
    let worker = spawn_worker(queue.clone(), ingestion, PIPELINE_QUEUE);

    let state = Arc::new(AppState {
        engine,
        queue,
        index,
        queue_name: PIPELINE_QUEUE,
        collection: index_cfg.collection.clone(),
    });

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(
        "{} v{} listening on {}",
        SERVICE_NAME.green().bold(),
        SERVICE_VERSION,
        host_url
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("Shutting down worker process...");
    worker.stop().await;

    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
}
