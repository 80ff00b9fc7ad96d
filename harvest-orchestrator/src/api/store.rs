//! Store API Handlers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use harvest_core::dto::store::{InitStoreRequest, InitStoreResponse, StoreKind};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// POST /store/init
/// Create the result tables of a store engine
pub async fn init_store(
    State(state): State<AppState>,
    payload: Result<Json<InitStoreRequest>, JsonRejection>,
) -> ApiResult<Json<InitStoreResponse>> {
    let Json(req) = payload?;

    let kind = StoreKind::parse(&req.kind).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Unsupported store kind '{}', expected 'sqlite' or 'mysql'",
            req.kind
        ))
    })?;

    tracing::info!("Initializing {} store schema", kind);
    state.store.init_schema(kind).await?;

    Ok(Json(InitStoreResponse {
        status: "success".to_string(),
        message: format!("{} store initialized", kind),
        timestamp: chrono::Utc::now(),
    }))
}
