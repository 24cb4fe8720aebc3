//! Health check endpoints

use axum::{extract::State, Json};
use capacity_core::store::Store;
use std::collections::BTreeMap;

use crate::dto::HealthResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        checks: None,
    }))
}

/// Ready check endpoint (database connectivity and stored invariants)
pub async fn ready_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let mut checks = BTreeMap::new();
    checks.insert(
        "database".to_string(),
        state.database.health_check().await.unwrap_or(false),
    );
    let stores: [&dyn Store; 3] = [
        state.projects.as_ref(),
        state.employees.as_ref(),
        state.capacity.as_ref(),
    ];
    for store in stores {
        checks.insert(
            store.name().to_string(),
            store.verify_integrity().await.unwrap_or(false),
        );
    }

    let status = if checks.values().all(|ok| *ok) {
        "ready"
    } else {
        "degraded"
    };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        version: state.version.clone(),
        checks: Some(checks),
    }))
}
