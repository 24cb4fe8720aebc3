//! Capacity grid endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use capacity_core::store::CapacityStore;
use capacity_core::{CapacityEntry, CapacityInput, CapacityScope};

use crate::dto::{CapacityQuery, EntryQuery, TotalResponse, TotalsQuery};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

/// List entries matching the optional `employeeId` / `projectId` filters
pub async fn list_capacity(
    State(state): State<AppState>,
    Query(query): Query<CapacityQuery>,
) -> ApiResult<Json<Vec<CapacityEntry>>> {
    let entries = state
        .capacity
        .list_entries(&query.into())
        .await
        .map_err(ApiError::store("Failed to fetch capacity"))?;
    Ok(Json(entries))
}

/// Get a single cell; `null` when absent
pub async fn get_entry(
    State(state): State<AppState>,
    Query(query): Query<EntryQuery>,
) -> ApiResult<Json<Option<CapacityEntry>>> {
    let Some(key) = query.into_key() else {
        return Ok(Json(None));
    };
    let entry = state
        .capacity
        .get_entry(&key)
        .await
        .map_err(ApiError::store("Failed to fetch capacity entry"))?;
    Ok(Json(entry))
}

/// Insert or overwrite a cell
pub async fn upsert_capacity(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CapacityInput>,
) -> ApiResult<Json<CapacityEntry>> {
    let entry = state
        .capacity
        .upsert_entry(req.into_write())
        .await
        .map_err(ApiError::store("Failed to update capacity"))?;
    Ok(Json(entry))
}

pub async fn delete_by_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .capacity
        .delete_by_employee(&employee_id)
        .await
        .map_err(ApiError::store("Failed to delete capacity"))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_by_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .capacity
        .delete_by_project(&project_id)
        .await
        .map_err(ApiError::store("Failed to delete capacity"))?;
    Ok(StatusCode::NO_CONTENT)
}

// ============ Totals ============

async fn total(state: &AppState, scope: CapacityScope) -> ApiResult<Json<TotalResponse>> {
    let total = state
        .capacity
        .sum_total(&scope)
        .await
        .map_err(ApiError::store("Failed to calculate totals"))?;
    Ok(Json(TotalResponse { total }))
}

/// Sum for one employee, project, country and task group
pub async fn task_group_total(
    State(state): State<AppState>,
    Query(query): Query<TotalsQuery>,
) -> ApiResult<Json<TotalResponse>> {
    total(&state, query.task_group_scope()).await
}

/// Sum for one employee, project and country
pub async fn country_total(
    State(state): State<AppState>,
    Query(query): Query<TotalsQuery>,
) -> ApiResult<Json<TotalResponse>> {
    total(&state, query.country_scope()).await
}

/// Sum for one employee and project
pub async fn project_total(
    State(state): State<AppState>,
    Query(query): Query<TotalsQuery>,
) -> ApiResult<Json<TotalResponse>> {
    total(&state, query.project_scope()).await
}
