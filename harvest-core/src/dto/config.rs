//! Configuration snapshot DTO

use serde::{Deserialize, Serialize};

use crate::domain::request::{Backend, SaveDataOption};
use crate::dto::collector::CollectorConfig;

/// Diagnostic view of the orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub job_timeout_secs: u64,
    pub max_retained_jobs: usize,
    pub default_save_option: SaveDataOption,
    /// Backends that have a collector endpoint configured
    pub configured_backends: Vec<Backend>,
    /// Collector configuration of the most recently started job, credentials removed
    pub last_job: Option<CollectorConfig>,
}
