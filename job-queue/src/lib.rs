//! FIFO job broker plus the durable pipeline job status store.
//!
//! Both live in one SQLite database (WAL mode): a keyed list table backs the
//! broker, `pipeline_jobs` holds the status records. The broker surface
//! deliberately mirrors a list-based message queue: `enqueue` reports
//! success as a bool, `dequeue` returns `None` on both "empty" and "broker
//! unavailable" so the worker loop just keeps polling.

mod broker;
mod errors;
mod job;
mod status;

pub use errors::QueueError;
pub use job::{JobRequest, JobResult, JobStatus, PipelineJob};

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{error, info};
use uuid::Uuid;

/// Queue storage configuration.
#[derive(Clone, Debug)]
pub struct QueueConfig {
    /// SQLite connection URL, e.g. `sqlite:data/lolqa.db`.
    pub database_url: String,
}

impl QueueConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data/lolqa.db".into()),
        }
    }
}

/// Handle to the broker and the job status store.
#[derive(Clone)]
pub struct JobQueue {
    pool: SqlitePool,
}

impl JobQueue {
    /// Open (creating if missing) the backing database and run migrations.
    pub async fn connect(cfg: &QueueConfig) -> Result<Self, QueueError> {
        ensure_parent_dir(&cfg.database_url);

        let options = SqliteConnectOptions::from_str(&cfg.database_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let queue = Self { pool };
        queue.run_migrations().await?;
        info!("Job queue storage ready at {}", cfg.database_url);
        Ok(queue)
    }

    /// Wrap an existing pool (tests use an in-memory pool).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, QueueError> {
        let queue = Self { pool };
        queue.run_migrations().await?;
        Ok(queue)
    }

    async fn run_migrations(&self) -> Result<(), QueueError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS job_queue (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                queue TEXT NOT NULL,
                payload TEXT NOT NULL,
                enqueued_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pipeline_jobs (
                job_id TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                message TEXT NOT NULL DEFAULT '',
                result TEXT,
                error TEXT,
                created_at TEXT NOT NULL,
                started_at TEXT,
                completed_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ---------- broker ----------

    /// Append a job to the named queue. Returns `false` when the broker is
    /// unavailable; the caller must then mark the job failed rather than
    /// silently losing it.
    pub async fn enqueue(&self, queue: &str, job: &JobRequest) -> bool {
        match broker::enqueue(&self.pool, queue, job).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error enqueueing job: {e}");
                false
            }
        }
    }

    /// Pop the oldest job; with `timeout_secs > 0` waits up to that long.
    /// `None` means "no job" or "broker unavailable"; keep polling.
    pub async fn dequeue(&self, queue: &str, timeout_secs: u64) -> Option<JobRequest> {
        broker::dequeue(&self.pool, queue, timeout_secs).await
    }

    /// Jobs currently waiting in the named queue (0 on broker failure).
    pub async fn queue_length(&self, queue: &str) -> u64 {
        broker::queue_length(&self.pool, queue).await
    }

    // ---------- status store ----------

    /// Create the status record in `queued` state.
    pub async fn create_job(&self, job_id: Uuid, message: &str) -> Result<(), QueueError> {
        status::create_job(&self.pool, job_id, message).await
    }

    /// Advance a job's status. Transitions are monotonic; regressions are
    /// rejected with [`QueueError::InvalidTransition`].
    pub async fn update_job(
        &self,
        job_id: Uuid,
        status: JobStatus,
        message: &str,
        result: Option<JobResult>,
        error: Option<&str>,
    ) -> Result<(), QueueError> {
        status::update_job(&self.pool, job_id, status, message, result, error).await
    }

    /// Fetch a job record by id.
    pub async fn get_job(&self, job_id: Uuid) -> Result<Option<PipelineJob>, QueueError> {
        status::get_job(&self.pool, job_id).await
    }
}

/// For file-backed SQLite URLs, make sure the parent directory exists.
fn ensure_parent_dir(database_url: &str) {
    let Some(path) = database_url.strip_prefix("sqlite:") else {
        return;
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.starts_with(":memory:") || path.is_empty() {
        return;
    }
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    async fn memory_queue() -> JobQueue {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        JobQueue::from_pool(pool).await.unwrap()
    }

    fn request(force_refresh: bool) -> JobRequest {
        JobRequest {
            job_id: Uuid::new_v4(),
            sources: None,
            force_refresh,
        }
    }

    #[tokio::test]
    async fn fifo_ordering_is_preserved() {
        let q = memory_queue().await;
        let first = request(false);
        let second = request(true);

        assert!(q.enqueue("pipeline_jobs", &first).await);
        assert!(q.enqueue("pipeline_jobs", &second).await);
        assert_eq!(q.queue_length("pipeline_jobs").await, 2);

        let a = q.dequeue("pipeline_jobs", 0).await.unwrap();
        let b = q.dequeue("pipeline_jobs", 0).await.unwrap();
        assert_eq!(a.job_id, first.job_id);
        assert_eq!(b.job_id, second.job_id);
        assert_eq!(q.queue_length("pipeline_jobs").await, 0);
    }

    #[tokio::test]
    async fn empty_dequeue_returns_none_within_timeout() {
        let q = memory_queue().await;
        let start = Instant::now();
        let job = q.dequeue("pipeline_jobs", 1).await;
        assert!(job.is_none());
        let elapsed = start.elapsed();
        assert!(elapsed.as_secs_f64() >= 0.9, "returned too early: {elapsed:?}");
        assert!(elapsed.as_secs() < 5, "overshot the timeout: {elapsed:?}");
    }

    #[tokio::test]
    async fn non_blocking_dequeue_returns_immediately() {
        let q = memory_queue().await;
        let start = Instant::now();
        assert!(q.dequeue("pipeline_jobs", 0).await.is_none());
        assert!(start.elapsed().as_millis() < 200);
    }

    #[tokio::test]
    async fn queues_are_isolated_by_name() {
        let q = memory_queue().await;
        q.enqueue("a", &request(false)).await;
        assert!(q.dequeue("b", 0).await.is_none());
        assert!(q.dequeue("a", 0).await.is_some());
    }

    #[tokio::test]
    async fn job_status_progresses_and_stamps_timestamps() {
        let q = memory_queue().await;
        let id = Uuid::new_v4();
        q.create_job(id, "Job queued").await.unwrap();

        let job = q.get_job(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Queued);
        assert!(job.started_at.is_none());

        q.update_job(id, JobStatus::Running, "Starting pipeline...", None, None)
            .await
            .unwrap();
        let job = q.get_job(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert!(job.started_at.is_some());
        assert!(job.completed_at.is_none());

        let result = JobResult {
            documents: 8,
            chunks: 21,
        };
        q.update_job(id, JobStatus::Completed, "done", Some(result), None)
            .await
            .unwrap();
        let job = q.get_job(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.completed_at.is_some());
        assert_eq!(job.result.unwrap().chunks, 21);
    }

    #[tokio::test]
    async fn status_never_regresses() {
        let q = memory_queue().await;
        let id = Uuid::new_v4();
        q.create_job(id, "queued").await.unwrap();
        q.update_job(id, JobStatus::Running, "running", None, None)
            .await
            .unwrap();
        q.update_job(id, JobStatus::Completed, "done", None, None)
            .await
            .unwrap();

        let err = q
            .update_job(id, JobStatus::Running, "again", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, QueueError::InvalidTransition { .. }));

        let job = q.get_job(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn queued_job_may_fail_directly() {
        // Enqueue failure path: queued -> failed without running.
        let q = memory_queue().await;
        let id = Uuid::new_v4();
        q.create_job(id, "queued").await.unwrap();
        q.update_job(
            id,
            JobStatus::Failed,
            "Failed to enqueue job",
            None,
            Some("broker unavailable"),
        )
        .await
        .unwrap();
        let job = q.get_job(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("broker unavailable"));
    }

    #[tokio::test]
    async fn unknown_job_is_none() {
        let q = memory_queue().await;
        assert!(q.get_job(Uuid::new_v4()).await.unwrap().is_none());
    }
}
