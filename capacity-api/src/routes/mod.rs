//! API route handlers

pub mod capacity;
pub mod employee;
pub mod health;
pub mod project;
pub mod transfer;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::state::AppState;

/// Create the API router: `/health`, `/ready` and everything under `/api`
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .nest("/api", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Project endpoints
        .route(
            "/projects",
            get(project::list_projects).post(project::create_project),
        )
        .route(
            "/projects/:id",
            get(project::get_project)
                .put(project::update_project)
                .delete(project::delete_project),
        )
        .route("/projects/:id/task-groups", post(project::create_task_group))
        .route(
            "/projects/task-groups/:id",
            put(project::update_task_group).delete(project::delete_task_group),
        )
        .route("/projects/task-groups/:id/metrics", post(project::create_metric))
        .route(
            "/projects/metrics/:id",
            put(project::update_metric).delete(project::delete_metric),
        )
        // Employee endpoints
        .route(
            "/employees",
            get(employee::list_employees).post(employee::create_employee),
        )
        .route(
            "/employees/:id",
            get(employee::get_employee)
                .put(employee::update_employee)
                .delete(employee::delete_employee),
        )
        // Capacity endpoints
        .route(
            "/capacity",
            get(capacity::list_capacity).post(capacity::upsert_capacity),
        )
        .route("/capacity/entry", get(capacity::get_entry))
        .route("/capacity/employee/:id", delete(capacity::delete_by_employee))
        .route("/capacity/project/:id", delete(capacity::delete_by_project))
        .route("/capacity/totals/task-group", get(capacity::task_group_total))
        .route("/capacity/totals/country", get(capacity::country_total))
        .route("/capacity/totals/project", get(capacity::project_total))
        // Export / import
        .route("/export", get(transfer::export_data))
        .route("/import", post(transfer::import_data))
}
