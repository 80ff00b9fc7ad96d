//! Service information and store endpoints

use crate::HarvestClient;
use crate::error::Result;
use harvest_core::dto::backend::BackendList;
use harvest_core::dto::config::ConfigSnapshot;
use harvest_core::dto::store::{InitStoreRequest, InitStoreResponse, StoreKind};
use serde_json::Value;

impl HarvestClient {
    /// List the backends the orchestrator knows about
    pub async fn list_backends(&self) -> Result<BackendList> {
        let response = self.client.get(self.url("/backends")).send().await?;

        self.handle_response(response).await
    }

    /// Get the configuration snapshot, credentials removed
    pub async fn get_config(&self) -> Result<ConfigSnapshot> {
        let response = self.client.get(self.url("/config")).send().await?;

        self.handle_response(response).await
    }

    /// Create the result tables of a store engine
    pub async fn init_store(&self, kind: StoreKind) -> Result<InitStoreResponse> {
        let response = self
            .client
            .post(self.url("/store/init"))
            .json(&InitStoreRequest {
                kind: kind.as_str().to_string(),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Health check
    pub async fn health(&self) -> Result<Value> {
        let response = self.client.get(self.url("/health")).send().await?;

        self.handle_response(response).await
    }
}
