//! Queue worker: a supervised background task that drains pipeline jobs.
//!
//! One worker per queue. Each job runs to completion (success or failure)
//! before the next dequeue; errors never escape the loop. Shutdown is
//! cooperative: a watch signal interrupts the blocking dequeue between jobs,
//! so an unpopped job is never lost to shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use job_queue::{JobQueue, JobRequest, JobResult, JobStatus, QueueError};

use crate::{IngestionPipeline, PipelineOutcome};

/// Blocking dequeue window per poll.
const DEQUEUE_TIMEOUT_SECS: u64 = 5;
/// Pause after an empty poll.
const IDLE_SLEEP: Duration = Duration::from_secs(1);
/// Longer pause after an unexpected error, to avoid a tight error loop.
const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Handle to a running worker task with explicit stop semantics.
pub struct WorkerHandle {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl WorkerHandle {
    /// Signal shutdown and wait for the loop to exit. A job already being
    /// processed runs to completion first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            error!("Worker task join failed: {e}");
        }
    }
}

/// Start the worker loop as a supervised background task.
pub fn spawn_worker(
    queue: JobQueue,
    pipeline: Arc<IngestionPipeline>,
    queue_name: impl Into<String>,
) -> WorkerHandle {
    let (shutdown, mut shutdown_rx) = watch::channel(false);
    let queue_name = queue_name.into();

    let handle = tokio::spawn(async move {
        info!("Starting pipeline worker process...");
        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Worker received shutdown signal");
                    break;
                }
                job = queue.dequeue(&queue_name, DEQUEUE_TIMEOUT_SECS) => {
                    match job {
                        Some(job) => run_job(&queue, &pipeline, job).await,
                        None => tokio::time::sleep(IDLE_SLEEP).await,
                    }
                }
            }
        }
        info!("Pipeline worker stopped");
    });

    WorkerHandle { shutdown, handle }
}

/// Process one job. All failures end up in the status store; only a failure
/// of the status store itself is "unexpected" and triggers the back-off.
async fn run_job(queue: &JobQueue, pipeline: &IngestionPipeline, job: JobRequest) {
    info!("Worker picked up job: {}", job.job_id);
    if let Err(e) = execute_job(queue, pipeline, &job).await {
        error!("Error in worker while processing job {}: {e}", job.job_id);
        tokio::time::sleep(ERROR_BACKOFF).await;
    }
}

async fn execute_job(
    queue: &JobQueue,
    pipeline: &IngestionPipeline,
    job: &JobRequest,
) -> Result<(), QueueError> {
    queue
        .update_job(
            job.job_id,
            JobStatus::Running,
            "Starting pipeline...",
            None,
            None,
        )
        .await?;

    match pipeline.run(job.sources.as_deref(), job.force_refresh).await {
        Ok(PipelineOutcome { documents, chunks }) => {
            info!("Pipeline job {} completed successfully", job.job_id);
            queue
                .update_job(
                    job.job_id,
                    JobStatus::Completed,
                    &format!(
                        "Pipeline completed successfully. Processed {documents} documents."
                    ),
                    Some(JobResult { documents, chunks }),
                    None,
                )
                .await
        }
        Err(e) => {
            error!("Pipeline job {} failed: {e}", job.job_id);
            queue
                .update_job(
                    job.job_id,
                    JobStatus::Failed,
                    &e.to_string(),
                    None,
                    Some(&e.to_string()),
                )
                .await
        }
    }
}
