//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::request::{Backend, CollectionMode, JobRequest};

/// Job record
///
/// Owned by the orchestrator; clients only ever see snapshots of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub backend: Backend,
    pub mode: CollectionMode,
    pub status: JobStatus,
    pub message: String,
    /// Request parameters (credentials are never serialized)
    pub parameters: JobRequest,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
}

/// Job execution status
///
/// Moves strictly forward: Pending -> Running -> Completed | Failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether moving from `self` to `next` respects the state machine.
    ///
    /// Pending may fail directly when a job is cancelled before it starts.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Pending, JobStatus::Failed)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const MSG_PENDING: &str = "Job created, waiting to start";
pub const MSG_RUNNING: &str = "Job is running";
pub const MSG_COMPLETED: &str = "Job completed successfully";

impl JobRecord {
    /// Creates a pending record for an admitted request
    pub fn pending(id: String, request: JobRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            backend: request.backend,
            mode: request.mode,
            status: JobStatus::Pending,
            message: MSG_PENDING.to_string(),
            parameters: request,
            created_at,
            started_at: None,
            completed_at: None,
            failed_at: None,
        }
    }

    pub fn mark_running(&mut self, at: DateTime<Utc>) {
        self.status = JobStatus::Running;
        self.message = MSG_RUNNING.to_string();
        self.started_at = Some(at);
    }

    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.status = JobStatus::Completed;
        self.message = MSG_COMPLETED.to_string();
        self.completed_at = Some(at);
    }

    pub fn mark_failed(&mut self, reason: &str, at: DateTime<Utc>) {
        self.status = JobStatus::Failed;
        self.message = format!("Job failed: {}", reason);
        self.failed_at = Some(at);
    }
}
