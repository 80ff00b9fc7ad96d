//! Backend and configuration API Handlers
//!
//! Read-only descriptive endpoints.

use axum::{Json, extract::State};
use harvest_core::domain::backend;
use harvest_core::dto::backend::BackendList;
use harvest_core::dto::config::ConfigSnapshot;

use crate::api::AppState;

/// GET /backends
/// Static catalogue of supported backends
pub async fn list_backends() -> Json<BackendList> {
    Json(BackendList {
        backends: backend::catalogue(),
    })
}

/// GET /config
/// Diagnostic snapshot of the configuration in effect
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigSnapshot> {
    Json(state.orchestrator.config_snapshot())
}
