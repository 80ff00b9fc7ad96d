//! Job Service
//!
//! Admission and background execution of collection jobs.
//!
//! A job is registered as Pending synchronously on submit, then a background
//! task waits for the execution lane, runs the collector under a deadline and
//! writes exactly one terminal state. Jobs run one at a time because the
//! store connection is shared and released after each job that uses it.

use chrono::Utc;
use harvest_core::domain::job::{JobRecord, JobStatus};
use harvest_core::domain::request::{JobRequest, SaveDataOption};
use harvest_core::dto::collector::CollectorConfig;
use harvest_core::dto::config::ConfigSnapshot;
use harvest_core::validation::{self, ValidationError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::collector::{CollectorError, CollectorFactory};
use crate::repository::{JobRegistry, RegistryError};
use crate::store::Store;

/// Service error type
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job {0} not found")]
    NotFound(String),

    #[error("Job {id} is already {status}")]
    AlreadyTerminal { id: String, status: JobStatus },

    #[error("{0}")]
    Registry(#[from] RegistryError),
}

/// A request that passed admission rules
///
/// Only [`ValidatedRequest::new`] builds one, so the orchestrator never sees
/// an unchecked request.
#[derive(Debug, Clone)]
pub struct ValidatedRequest(JobRequest);

impl ValidatedRequest {
    pub fn new(request: JobRequest) -> Result<Self, ValidationError> {
        validation::validate(&request)?;
        Ok(Self(request))
    }

    pub fn into_inner(self) -> JobRequest {
        self.0
    }
}

/// Tunables of the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Deadline for a single collector run
    pub job_timeout: Duration,
    /// Persistence mode assumed before any job has run
    pub default_save_option: SaveDataOption,
    /// How long shutdown waits for the running job to finish cleanup
    pub shutdown_grace: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            job_timeout: Duration::from_secs(1800),
            default_save_option: SaveDataOption::Json,
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

pub struct JobOrchestrator {
    registry: Arc<JobRegistry>,
    collectors: Arc<dyn CollectorFactory>,
    store: Arc<dyn Store>,
    settings: OrchestratorSettings,
    execution_lane: Arc<Semaphore>,
    sequence: AtomicU64,
    cancellations: Mutex<HashMap<String, CancellationToken>>,
    last_job: RwLock<Option<CollectorConfig>>,
    shutdown: CancellationToken,
}

impl JobOrchestrator {
    pub fn new(
        registry: Arc<JobRegistry>,
        collectors: Arc<dyn CollectorFactory>,
        store: Arc<dyn Store>,
        settings: OrchestratorSettings,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry,
            collectors,
            store,
            settings,
            execution_lane: Arc::new(Semaphore::new(1)),
            sequence: AtomicU64::new(0),
            cancellations: Mutex::new(HashMap::new()),
            last_job: RwLock::new(None),
            shutdown: CancellationToken::new(),
        })
    }

    /// Admit a job and schedule it in the background
    ///
    /// The pending record is in the registry before this returns; the
    /// collector runs later on a spawned task. Must be called from within a
    /// tokio runtime.
    pub fn submit(self: &Arc<Self>, request: ValidatedRequest) -> Result<JobRecord, JobError> {
        let request = request.into_inner();
        let now = Utc::now();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let id = format!(
            "job_{}_{}_{:04}",
            now.format("%Y%m%d_%H%M%S"),
            request.backend.code(),
            seq
        );

        let record = JobRecord::pending(id.clone(), request.clone(), now);
        self.registry.put(record.clone())?;

        let cancel = self.shutdown.child_token();
        self.cancellations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), cancel.clone());

        info!(
            "Job {} admitted ({} / {})",
            id, request.backend, request.mode
        );

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.execute(id, request, cancel).await;
        });

        Ok(record)
    }

    /// Get a job by ID
    pub fn status(&self, id: &str) -> Result<JobRecord, JobError> {
        self.registry
            .get(id)
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    /// Snapshot of all retained jobs
    pub fn list(&self) -> Vec<JobRecord> {
        self.registry.list()
    }

    /// Request cancellation of a pending or running job
    ///
    /// Returns the record as it was when cancellation was signalled; the
    /// background task writes the Failed state shortly after.
    pub fn cancel(&self, id: &str) -> Result<JobRecord, JobError> {
        let record = self.status(id)?;

        if record.status.is_terminal() {
            return Err(JobError::AlreadyTerminal {
                id: id.to_string(),
                status: record.status,
            });
        }

        if let Some(token) = self
            .cancellations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
        {
            info!("Cancelling job {}", id);
            token.cancel();
        }

        Ok(record)
    }

    /// Diagnostic view of the configuration in effect
    pub fn config_snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            job_timeout_secs: self.settings.job_timeout.as_secs(),
            max_retained_jobs: self.registry.max_retained(),
            default_save_option: self.settings.default_save_option,
            configured_backends: self.collectors.configured_backends(),
            last_job: self
                .last_job
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    /// Cancel in-flight jobs and release the store
    pub async fn shutdown(&self) {
        info!("Shutting down job orchestrator");
        self.shutdown.cancel();

        // Wait for the running job, if any, to write its terminal state.
        match tokio::time::timeout(self.settings.shutdown_grace, self.execution_lane.acquire())
            .await
        {
            Ok(_permit) => {}
            Err(_) => warn!(
                "Running job did not finish within {:?}",
                self.settings.shutdown_grace
            ),
        }
        self.execution_lane.close();

        if self.current_save_option().requires_connection() {
            if let Err(e) = self.store.close().await {
                warn!("Failed to release store on shutdown: {}", e);
            }
        }
    }

    /// Persistence mode of the most recent job, or the default
    fn current_save_option(&self) -> SaveDataOption {
        self.last_job
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|config| config.save_data_option)
            .unwrap_or(self.settings.default_save_option)
    }

    // =========================================================================
    // Background execution
    // =========================================================================

    async fn execute(self: Arc<Self>, id: String, request: JobRequest, cancel: CancellationToken) {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            permit = Arc::clone(&self.execution_lane).acquire_owned() => permit.ok(),
        };

        let Some(_permit) = permit else {
            self.finish(&id, Err(CollectorError::Cancelled));
            self.forget(&id);
            return;
        };

        if let Err(e) = self.registry.update(&id, |r| r.mark_running(Utc::now())) {
            error!("Failed to start job {}: {}", id, e);
            self.forget(&id);
            return;
        }
        info!("Job {} started", id);

        let outcome = self.run_collector(&id, &request, &cancel).await;
        self.finish(&id, outcome);

        if request.save_data_option.requires_connection() {
            debug!("Releasing {} store after job {}", request.save_data_option, id);
            if let Err(e) = self.store.close().await {
                warn!("Failed to release store after job {}: {}", id, e);
            }
        }

        self.forget(&id);
    }

    async fn run_collector(
        &self,
        id: &str,
        request: &JobRequest,
        cancel: &CancellationToken,
    ) -> Result<(), CollectorError> {
        let config = CollectorConfig::from_request(id, request);
        *self.last_job.write().unwrap_or_else(PoisonError::into_inner) = Some(config.redacted());

        // Construction and run share their own task so a panic in either is
        // caught as a JoinError.
        let collectors = Arc::clone(&self.collectors);
        let backend = request.backend;
        let run_cancel = cancel.child_token();
        let token = run_cancel.clone();
        let mut handle = tokio::spawn(async move {
            let collector = collectors.create(backend)?;
            collector.run(config, token).await
        });
        let abort = handle.abort_handle();

        let timeout = self.settings.job_timeout;
        let outcome = tokio::select! {
            joined = &mut handle => match joined {
                Ok(result) => result,
                Err(e) if e.is_panic() => Err(CollectorError::Panicked(panic_message(e.into_panic()))),
                Err(e) => Err(CollectorError::Failed(e.to_string())),
            },
            _ = tokio::time::sleep(timeout) => Err(CollectorError::Timeout(timeout)),
            _ = cancel.cancelled() => Err(CollectorError::Cancelled),
        };

        if outcome.is_err() {
            run_cancel.cancel();
            abort.abort();
        }

        outcome
    }

    fn finish(&self, id: &str, outcome: Result<(), CollectorError>) {
        let now = Utc::now();
        let result = match &outcome {
            Ok(()) => self.registry.update(id, |r| r.mark_completed(now)),
            Err(e) => self.registry.update(id, |r| r.mark_failed(&e.to_string(), now)),
        };

        match (result, outcome) {
            (Ok(_), Ok(())) => info!("Job {} completed", id),
            (Ok(_), Err(e)) => error!("Job {} failed: {}", id, e),
            (Err(e), _) => error!("Failed to record outcome of job {}: {}", id, e),
        }
    }

    fn forget(&self, id: &str) {
        self.cancellations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
