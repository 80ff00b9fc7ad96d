//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod backend;
pub mod error;
pub mod health;
pub mod job;
pub mod store;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::service::JobOrchestrator;
use crate::store::Store;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<JobOrchestrator>,
    pub store: Arc<dyn Store>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        // Job endpoints
        .route("/jobs", post(job::submit_job))
        .route("/jobs", get(job::list_jobs))
        .route("/jobs/{id}", get(job::get_job))
        .route("/jobs/{id}/cancel", post(job::cancel_job))
        // Store endpoints
        .route("/store/init", post(store::init_store))
        // Descriptive endpoints
        .route("/backends", get(backend::list_backends))
        .route("/config", get(backend::get_config))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
