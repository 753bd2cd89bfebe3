//! Pipeline job model: queued payload and durable status record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a pipeline job.
///
/// Valid sequences are subsequences of `queued → running → completed` or
/// `queued → running → failed`; the store rejects regressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Ordering rank used to enforce monotonic transitions.
    pub(crate) fn rank(self) -> u8 {
        match self {
            JobStatus::Queued => 0,
            JobStatus::Running => 1,
            JobStatus::Completed | JobStatus::Failed => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(JobStatus::Queued),
            "running" => Some(JobStatus::Running),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters reported by a completed ingestion run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct JobResult {
    pub documents: u64,
    pub chunks: u64,
}

/// Payload carried through the broker from `/ingest` to the worker.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobRequest {
    pub job_id: Uuid,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    #[serde(default)]
    pub force_refresh: bool,
}

/// Durable status record, visible through `GET /status/{job_id}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineJob {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}
