//! Job DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::job::{JobRecord, JobStatus};

/// Response to a job submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitJobResponse {
    pub id: String,
    pub status: JobStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<&JobRecord> for SubmitJobResponse {
    fn from(record: &JobRecord) -> Self {
        Self {
            id: record.id.clone(),
            status: record.status,
            message: record.message.clone(),
            created_at: record.created_at,
        }
    }
}

/// Listing of all retained jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobList {
    pub total: usize,
    pub jobs: Vec<JobRecord>,
}

impl From<Vec<JobRecord>> for JobList {
    fn from(jobs: Vec<JobRecord>) -> Self {
        Self {
            total: jobs.len(),
            jobs,
        }
    }
}
