//! HTTP collector
//!
//! Forwards a job's configuration to an external collector worker. Each
//! backend maps to one worker endpoint; the worker is expected to respond
//! once the collection has finished, with a 2xx status on success.

use async_trait::async_trait;
use harvest_core::domain::request::Backend;
use harvest_core::dto::collector::CollectorConfig;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{Collector, CollectorError, CollectorFactory};

/// Factory for collectors backed by HTTP worker endpoints
pub struct HttpCollectorFactory {
    client: Client,
    endpoints: HashMap<Backend, String>,
}

impl HttpCollectorFactory {
    /// Creates a new factory
    ///
    /// # Arguments
    /// * `endpoints` - Worker URL per backend
    /// * `connect_timeout` - Connection timeout for worker requests
    pub fn new(
        endpoints: HashMap<Backend, String>,
        connect_timeout: Duration,
    ) -> Result<Self, CollectorError> {
        let client = Client::builder().connect_timeout(connect_timeout).build()?;
        Ok(Self { client, endpoints })
    }
}

impl CollectorFactory for HttpCollectorFactory {
    fn create(&self, backend: Backend) -> Result<Box<dyn Collector>, CollectorError> {
        let endpoint = self
            .endpoints
            .get(&backend)
            .ok_or(CollectorError::Unavailable(backend))?;

        Ok(Box::new(HttpCollector {
            client: self.client.clone(),
            endpoint: endpoint.clone(),
        }))
    }

    fn configured_backends(&self) -> Vec<Backend> {
        Backend::ALL
            .into_iter()
            .filter(|b| self.endpoints.contains_key(b))
            .collect()
    }
}

struct HttpCollector {
    client: Client,
    endpoint: String,
}

#[async_trait]
impl Collector for HttpCollector {
    async fn run(
        &self,
        config: CollectorConfig,
        cancel: CancellationToken,
    ) -> Result<(), CollectorError> {
        debug!(
            "Dispatching job {} to collector at {}",
            config.job_id, self.endpoint
        );

        let request = self.client.post(&self.endpoint).json(&config).send();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CollectorError::Cancelled),
            response = request => response?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollectorError::Failed(format!(
                "collector returned {}: {}",
                status,
                body.trim()
            )));
        }

        Ok(())
    }
}
