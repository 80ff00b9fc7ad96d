//! Collector seam
//!
//! A collector performs the actual data collection for one backend. The
//! orchestrator obtains one per job from a [`CollectorFactory`] and awaits
//! [`Collector::run`] with the job's own configuration.

pub mod http;

use async_trait::async_trait;
use harvest_core::domain::request::Backend;
use harvest_core::dto::collector::CollectorConfig;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use http::HttpCollectorFactory;

/// Faults raised while constructing or running a collector
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("no collector available for backend '{0}'")]
    Unavailable(Backend),

    #[error("{0}")]
    Failed(String),

    #[error("collector request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("collector timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("job was cancelled")]
    Cancelled,

    #[error("collector panicked: {0}")]
    Panicked(String),
}

/// A runnable unit of collection work
#[async_trait]
pub trait Collector: Send + Sync {
    /// Runs the collection to completion
    ///
    /// # Arguments
    /// * `config` - Configuration of this job only
    /// * `cancel` - Signalled when the job is cancelled or times out
    async fn run(&self, config: CollectorConfig, cancel: CancellationToken)
    -> Result<(), CollectorError>;
}

/// Produces collectors keyed by backend
pub trait CollectorFactory: Send + Sync {
    fn create(&self, backend: Backend) -> Result<Box<dyn Collector>, CollectorError>;

    /// Backends this factory can build a collector for
    fn configured_backends(&self) -> Vec<Backend>;
}
