//! Harvest HTTP Client
//!
//! A type-safe HTTP client for the Harvest orchestrator API, used by the CLI
//! and by anything else that submits collection jobs.
//!
//! # Example
//!
//! ```no_run
//! use harvest_client::HarvestClient;
//! use harvest_core::domain::request::{Backend, CollectionMode, JobRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = HarvestClient::new("http://localhost:8080");
//!
//!     let mut request = JobRequest::new(Backend::Xiaohongshu, CollectionMode::Search);
//!     request.keywords = Some("coffee,tea".to_string());
//!
//!     let submitted = client.submit_job(&request).await?;
//!     println!("Submitted job: {}", submitted.id);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod system;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Harvest orchestrator API
///
/// Methods are organized into:
/// - Job lifecycle (submit, get, list, cancel, wait)
/// - Service information (backends, config, health)
/// - Store initialization
#[derive(Debug, Clone)]
pub struct HarvestClient {
    /// Base URL of the orchestrator (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl HarvestClient {
    /// Create a new orchestrator client
    ///
    /// # Example
    /// ```
    /// use harvest_client::HarvestClient;
    ///
    /// let client = HarvestClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new orchestrator client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the orchestrator
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
