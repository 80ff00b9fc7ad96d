//! Test doubles shared by the service and API tests

use async_trait::async_trait;
use harvest_core::domain::job::JobRecord;
use harvest_core::domain::request::Backend;
use harvest_core::dto::collector::CollectorConfig;
use harvest_core::dto::store::StoreKind;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::collector::{Collector, CollectorError, CollectorFactory};
use crate::service::job::JobOrchestrator;
use crate::store::{Store, StoreError};

/// How stub collectors behave
#[derive(Debug, Clone)]
pub enum Behavior {
    Succeed,
    Fail(String),
    /// Runs until cancelled
    Block,
    Panic,
    /// The factory refuses to build a collector
    Unavailable,
    /// The factory itself panics
    PanicOnCreate,
}

pub struct StubCollectorFactory {
    behavior: Behavior,
}

impl StubCollectorFactory {
    pub fn new(behavior: Behavior) -> Self {
        Self { behavior }
    }
}

impl CollectorFactory for StubCollectorFactory {
    fn create(&self, backend: Backend) -> Result<Box<dyn Collector>, CollectorError> {
        match self.behavior {
            Behavior::Unavailable => Err(CollectorError::Unavailable(backend)),
            Behavior::PanicOnCreate => panic!("factory exploded"),
            _ => Ok(Box::new(StubCollector {
                behavior: self.behavior.clone(),
            })),
        }
    }

    fn configured_backends(&self) -> Vec<Backend> {
        match self.behavior {
            Behavior::Unavailable => Vec::new(),
            _ => Backend::ALL.to_vec(),
        }
    }
}

struct StubCollector {
    behavior: Behavior,
}

#[async_trait]
impl Collector for StubCollector {
    async fn run(
        &self,
        _config: CollectorConfig,
        cancel: CancellationToken,
    ) -> Result<(), CollectorError> {
        match &self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail(reason) => Err(CollectorError::Failed(reason.clone())),
            Behavior::Block => {
                cancel.cancelled().await;
                Err(CollectorError::Cancelled)
            }
            Behavior::Panic => panic!("collector exploded"),
            Behavior::Unavailable | Behavior::PanicOnCreate => unreachable!(),
        }
    }
}

/// Store that counts calls instead of touching a database
#[derive(Default)]
pub struct RecordingStore {
    init_calls: AtomicUsize,
    close_calls: AtomicUsize,
    fail_init: bool,
    fail_close: bool,
}

impl RecordingStore {
    pub fn failing_close() -> Self {
        Self {
            fail_close: true,
            ..Default::default()
        }
    }

    pub fn failing_init() -> Self {
        Self {
            fail_init: true,
            ..Default::default()
        }
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for RecordingStore {
    async fn init_schema(&self, kind: StoreKind) -> Result<(), StoreError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            return Err(StoreError::NotConfigured(kind));
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

/// Polls until the job reaches a terminal state, panicking after two seconds
pub async fn wait_for_terminal(orchestrator: &Arc<JobOrchestrator>, id: &str) -> JobRecord {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);

    loop {
        let record = orchestrator.status(id).expect("job should exist");
        if record.status.is_terminal() {
            return record;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("job {} stuck in {}", id, record.status);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
