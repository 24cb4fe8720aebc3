//! Employee endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use capacity_core::store::EmployeeStore;
use capacity_core::{Employee, EmployeeUpdate, NewEmployee};

use crate::dto::EmployeeQuery;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

/// List employees, optionally only those assigned to `projectId`
pub async fn list_employees(
    State(state): State<AppState>,
    Query(query): Query<EmployeeQuery>,
) -> ApiResult<Json<Vec<Employee>>> {
    let project_id = query.project_id();
    let employees = state
        .employees
        .list_employees(project_id.as_deref())
        .await
        .map_err(ApiError::store("Failed to fetch employees"))?;
    Ok(Json(employees))
}

/// Get an employee by ID
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Employee>> {
    let employee = state
        .employees
        .get_employee(&id)
        .await
        .map_err(ApiError::store("Failed to fetch employee"))?
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;
    Ok(Json(employee))
}

/// Create an employee; accepts either assignment shape
pub async fn create_employee(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewEmployee>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    let employee = state
        .employees
        .create_employee(req)
        .await
        .map_err(ApiError::store("Failed to create employee"))?;
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<EmployeeUpdate>,
) -> ApiResult<Json<Employee>> {
    let employee = state
        .employees
        .update_employee(&id, req)
        .await
        .map_err(ApiError::store("Failed to update employee"))?;
    Ok(Json(employee))
}

/// Delete an employee and their capacity entries
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .employees
        .delete_employee(&id)
        .await
        .map_err(ApiError::store("Failed to delete employee"))?;
    Ok(StatusCode::NO_CONTENT)
}
