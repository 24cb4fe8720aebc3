//! Export / import endpoints

use axum::{extract::State, Json};
use capacity_core::store::TransferStore;
use capacity_core::{ExportBundle, ImportBundle, ImportSummary};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

/// Snapshot of every project, employee and capacity entry
pub async fn export_data(State(state): State<AppState>) -> ApiResult<Json<ExportBundle>> {
    let bundle = state
        .transfer
        .export_all()
        .await
        .map_err(ApiError::store("Failed to export data"))?;
    Ok(Json(bundle))
}

/// Import an export document in one transaction
pub async fn import_data(
    State(state): State<AppState>,
    ApiJson(bundle): ApiJson<ImportBundle>,
) -> ApiResult<Json<ImportSummary>> {
    let summary = state
        .transfer
        .import_all(bundle)
        .await
        .map_err(ApiError::store("Failed to import data"))?;
    Ok(Json(summary))
}
