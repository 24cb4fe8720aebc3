//! Project, task group and metric endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use capacity_core::store::ProjectStore;
use capacity_core::{
    Metric, MetricUpdate, NewMetric, NewProject, NewTaskGroup, Project, ProjectUpdate, TaskGroup,
    TaskGroupUpdate,
};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

// ============ Projects ============

/// List all projects, fully nested
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    let projects = state
        .projects
        .list_projects()
        .await
        .map_err(ApiError::store("Failed to fetch projects"))?;
    Ok(Json(projects))
}

/// Get a project by ID
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Project>> {
    let project = state
        .projects
        .get_project(&id)
        .await
        .map_err(ApiError::store("Failed to fetch project"))?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    Ok(Json(project))
}

/// Create a project, with optional nested task groups and metrics
pub async fn create_project(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewProject>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state
        .projects
        .create_project(req)
        .await
        .map_err(ApiError::store("Failed to create project"))?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// Update a project's name, countries or platforms
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ProjectUpdate>,
) -> ApiResult<Json<Project>> {
    let project = state
        .projects
        .update_project(&id, req)
        .await
        .map_err(ApiError::store("Failed to update project"))?;
    Ok(Json(project))
}

/// Delete a project and everything under it
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .projects
        .delete_project(&id)
        .await
        .map_err(ApiError::store("Failed to delete project"))?;
    Ok(StatusCode::NO_CONTENT)
}

// ============ Task groups ============

/// Create a task group under a project
pub async fn create_task_group(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    ApiJson(req): ApiJson<NewTaskGroup>,
) -> ApiResult<(StatusCode, Json<TaskGroup>)> {
    let task_group = state
        .projects
        .create_task_group(&project_id, req)
        .await
        .map_err(ApiError::store("Failed to create task group"))?;
    Ok((StatusCode::CREATED, Json(task_group)))
}

pub async fn update_task_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<TaskGroupUpdate>,
) -> ApiResult<Json<TaskGroup>> {
    let task_group = state
        .projects
        .update_task_group(&id, req)
        .await
        .map_err(ApiError::store("Failed to update task group"))?;
    Ok(Json(task_group))
}

pub async fn delete_task_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .projects
        .delete_task_group(&id)
        .await
        .map_err(ApiError::store("Failed to delete task group"))?;
    Ok(StatusCode::NO_CONTENT)
}

// ============ Metrics ============

/// Create a metric under a task group
pub async fn create_metric(
    State(state): State<AppState>,
    Path(task_group_id): Path<String>,
    ApiJson(req): ApiJson<NewMetric>,
) -> ApiResult<(StatusCode, Json<Metric>)> {
    let metric = state
        .projects
        .create_metric(&task_group_id, req)
        .await
        .map_err(ApiError::store("Failed to create metric"))?;
    Ok((StatusCode::CREATED, Json(metric)))
}

pub async fn update_metric(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<MetricUpdate>,
) -> ApiResult<Json<Metric>> {
    let metric = state
        .projects
        .update_metric(&id, req)
        .await
        .map_err(ApiError::store("Failed to update metric"))?;
    Ok(Json(metric))
}

pub async fn delete_metric(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .projects
        .delete_metric(&id)
        .await
        .map_err(ApiError::store("Failed to delete metric"))?;
    Ok(StatusCode::NO_CONTENT)
}
