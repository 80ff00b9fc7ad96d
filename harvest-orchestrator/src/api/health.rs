//! Health Check API Handlers
//!
//! Liveness endpoints for monitoring.

use axum::Json;
use serde_json::{Value, json};

/// GET /
/// Service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Harvest collection service",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
    }))
}
