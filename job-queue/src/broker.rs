//! FIFO broker over a keyed list table.
//!
//! Push appends with a monotonic key; pop atomically removes the lowest key,
//! so ordering is insertion order for a single producer. `dequeue` with a
//! positive timeout emulates a blocking pop by polling until the deadline.

use std::time::Duration;

use sqlx::{Row, SqlitePool};
use tokio::time::Instant;
use tracing::error;

use crate::errors::QueueError;
use crate::job::JobRequest;

/// Poll interval while waiting on an empty queue.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub(crate) async fn enqueue(
    pool: &SqlitePool,
    queue: &str,
    job: &JobRequest,
) -> Result<(), QueueError> {
    let payload = serde_json::to_string(job)?;
    sqlx::query("INSERT INTO job_queue (queue, payload, enqueued_at) VALUES (?1, ?2, ?3)")
        .bind(queue)
        .bind(payload)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(pool)
        .await?;
    Ok(())
}

/// One non-blocking pop attempt.
async fn try_pop(pool: &SqlitePool, queue: &str) -> Result<Option<JobRequest>, QueueError> {
    let row = sqlx::query(
        "DELETE FROM job_queue \
         WHERE id = (SELECT id FROM job_queue WHERE queue = ?1 ORDER BY id LIMIT 1) \
         RETURNING payload",
    )
    .bind(queue)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let payload: String = row.try_get("payload")?;
            Ok(Some(serde_json::from_str(&payload)?))
        }
        None => Ok(None),
    }
}

/// Pop the oldest job, waiting up to `timeout_secs` for one to arrive.
///
/// Broker failures are reported as `None` so the worker loop keeps polling.
pub(crate) async fn dequeue(
    pool: &SqlitePool,
    queue: &str,
    timeout_secs: u64,
) -> Option<JobRequest> {
    let deadline = Instant::now() + Duration::from_secs(timeout_secs);

    loop {
        match try_pop(pool, queue).await {
            Ok(Some(job)) => return Some(job),
            Ok(None) => {}
            Err(e) => {
                error!("Error dequeueing job: {e}");
                return None;
            }
        }

        if timeout_secs == 0 || Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(POLL_INTERVAL.min(deadline - Instant::now())).await;
    }
}

pub(crate) async fn queue_length(pool: &SqlitePool, queue: &str) -> u64 {
    let res = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM job_queue WHERE queue = ?1")
        .bind(queue)
        .fetch_one(pool)
        .await;
    match res {
        Ok(n) => n as u64,
        Err(e) => {
            error!("Error getting queue length: {e}");
            0
        }
    }
}
