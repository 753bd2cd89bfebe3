//! Durable job-status records with monotonic transitions.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

use crate::errors::QueueError;
use crate::job::{JobResult, JobStatus, PipelineJob};

pub(crate) async fn create_job(
    pool: &SqlitePool,
    job_id: Uuid,
    message: &str,
) -> Result<(), QueueError> {
    sqlx::query(
        "INSERT INTO pipeline_jobs (job_id, status, message, created_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(job_id.to_string())
    .bind(JobStatus::Queued.as_str())
    .bind(message)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;
    Ok(())
}

/// Advance a job to `status`, stamping `started_at`/`completed_at` as the
/// state machine requires. Regressions return
/// [`QueueError::InvalidTransition`] and leave the row untouched.
pub(crate) async fn update_job(
    pool: &SqlitePool,
    job_id: Uuid,
    status: JobStatus,
    message: &str,
    result: Option<JobResult>,
    error: Option<&str>,
) -> Result<(), QueueError> {
    let current = get_job(pool, job_id).await?;
    if let Some(current) = current {
        if status.rank() <= current.status.rank() {
            return Err(QueueError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }
    }

    let now = Utc::now().to_rfc3339();
    let started_at = matches!(status, JobStatus::Running).then(|| now.clone());
    let completed_at =
        matches!(status, JobStatus::Completed | JobStatus::Failed).then(|| now.clone());
    let result_json = result.map(|value| serde_json::to_string(&value)).transpose()?;

    sqlx::query(
        "UPDATE pipeline_jobs \
         SET status = ?2, message = ?3, result = COALESCE(?4, result), error = ?5, \
             started_at = COALESCE(?6, started_at), completed_at = COALESCE(?7, completed_at) \
         WHERE job_id = ?1",
    )
    .bind(job_id.to_string())
    .bind(status.as_str())
    .bind(message)
    .bind(result_json)
    .bind(error)
    .bind(started_at)
    .bind(completed_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub(crate) async fn get_job(
    pool: &SqlitePool,
    job_id: Uuid,
) -> Result<Option<PipelineJob>, QueueError> {
    let row = sqlx::query("SELECT * FROM pipeline_jobs WHERE job_id = ?1")
        .bind(job_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(|r| row_to_job(&r)).transpose()
}

fn row_to_job(row: &SqliteRow) -> Result<PipelineJob, QueueError> {
    let job_id: String = row.try_get("job_id")?;
    let status: String = row.try_get("status")?;
    let result: Option<String> = row.try_get("result")?;

    Ok(PipelineJob {
        job_id: Uuid::parse_str(&job_id).unwrap_or_default(),
        status: JobStatus::parse(&status).unwrap_or(JobStatus::Failed),
        message: row.try_get("message")?,
        result: result
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?,
        error: row.try_get("error")?,
        created_at: parse_ts(row.try_get("created_at")?).unwrap_or_else(Utc::now),
        started_at: row
            .try_get::<Option<String>, _>("started_at")?
            .and_then(parse_ts),
        completed_at: row
            .try_get::<Option<String>, _>("completed_at")?
            .and_then(parse_ts),
    })
}

fn parse_ts(raw: String) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
