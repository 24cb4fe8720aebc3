//! Integration tests for the capacity API endpoints
//!
//! Each test runs the full router over a fresh in-memory database.

use axum::http::StatusCode;
use axum_test::TestServer;
use capacity_api::{create_router, AppState};
use serde_json::{json, Value};

/// Create test server
async fn create_test_server() -> TestServer {
    let state = AppState::in_memory().await.unwrap();
    let router = create_router(state);
    TestServer::new(router).unwrap()
}

/// Project P with countries A and B, one task group and two metrics
async fn create_sample_project(server: &TestServer) -> Value {
    let response = server
        .post("/api/projects")
        .json(&json!({
            "id": "p",
            "name": "Project P",
            "countries": ["A", "B"],
            "countryPlatforms": { "A": "2 Xi" },
            "taskGroups": [{
                "id": "t",
                "name": "Renewals",
                "metrics": [
                    { "id": "m1", "name": "License Renewal", "unit": "hours per license" },
                    { "id": "m2", "name": "Certificate Renewal" }
                ]
            }]
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn create_sample_employee(server: &TestServer) -> Value {
    let response = server
        .post("/api/employees")
        .json(&json!({
            "id": "e",
            "name": "Dana",
            "email": "dana@example.com",
            "assignedProjects": ["p"],
            "assignedCountriesByProject": { "p": ["A", "B"] }
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn put_capacity(server: &TestServer, country: &str, metric: &str, tpu: Value, count: Value) -> Value {
    let response = server
        .post("/api/capacity")
        .json(&json!({
            "employeeId": "e",
            "projectId": "p",
            "country": country,
            "taskGroupId": "t",
            "metricId": metric,
            "timePerUnit": tpu,
            "count": count
        }))
        .await;
    response.assert_status_ok();
    response.json()
}

async fn total(server: &TestServer, path: &str, query: &[(&str, &str)]) -> f64 {
    let mut request = server.get(path);
    for (key, value) in query {
        request = request.add_query_param(key, value);
    }
    let response = request.await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["total"].as_f64().unwrap()
}

// ============ Health Endpoint Tests ============

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server().await;

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
    assert!(body.get("checks").is_none());
}

#[tokio::test]
async fn test_ready_check() {
    let server = create_test_server().await;
    create_sample_project(&server).await;

    let response = server.get("/ready").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"], true);
    assert_eq!(body["checks"]["projects"], true);
    assert_eq!(body["checks"]["capacity"], true);
}

// ============ Project Endpoint Tests ============

#[tokio::test]
async fn test_create_and_get_project() {
    let server = create_test_server().await;
    let created = create_sample_project(&server).await;

    assert_eq!(created["id"], "p");
    assert_eq!(created["countryPlatforms"]["A"], "2 Xi");
    assert_eq!(created["taskGroups"][0]["metrics"][1]["unit"], "hours");

    let response = server.get("/api/projects/p").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, created);

    let response = server.get("/api/projects").await;
    response.assert_status_ok();
    let list: Vec<Value> = response.json();
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn test_get_project_not_found() {
    let server = create_test_server().await;

    let response = server.get("/api/projects/missing").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"], "Project not found");
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_create_project_with_blank_name_is_rejected() {
    let server = create_test_server().await;

    let response = server
        .post("/api/projects")
        .json(&json!({ "name": "  " }))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_platform_key_outside_countries_is_rejected() {
    let server = create_test_server().await;

    let response = server
        .post("/api/projects")
        .json(&json!({
            "name": "Project Q",
            "countries": ["A"],
            "countryPlatforms": { "Z": "1 Xi" }
        }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_update_project_keeps_missing_fields() {
    let server = create_test_server().await;
    create_sample_project(&server).await;

    let response = server
        .put("/api/projects/p")
        .json(&json!({ "name": "Renamed" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["countries"], json!(["A", "B"]));
    assert_eq!(body["taskGroups"][0]["metrics"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_missing_project_is_not_found() {
    let server = create_test_server().await;

    let response = server
        .put("/api/projects/missing")
        .json(&json!({ "name": "X" }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_task_group_and_metric_lifecycle() {
    let server = create_test_server().await;
    create_sample_project(&server).await;

    let response = server
        .post("/api/projects/p/task-groups")
        .json(&json!({ "name": "Variations" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let group: Value = response.json();
    let group_id = group["id"].as_str().unwrap().to_string();
    assert_eq!(group["projectId"], "p");

    let response = server
        .put(&format!("/api/projects/task-groups/{}", group_id))
        .json(&json!({ "name": "Type II Variations" }))
        .await;
    response.assert_status_ok();
    let renamed: Value = response.json();
    assert_eq!(renamed["name"], "Type II Variations");

    let response = server
        .post(&format!("/api/projects/task-groups/{}/metrics", group_id))
        .json(&json!({ "name": "Dossier" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let metric: Value = response.json();
    let metric_id = metric["id"].as_str().unwrap().to_string();
    assert_eq!(metric["unit"], "hours");

    let response = server
        .put(&format!("/api/projects/metrics/{}", metric_id))
        .json(&json!({ "unit": "hours per dossier" }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["name"], "Dossier");
    assert_eq!(updated["unit"], "hours per dossier");

    server
        .delete(&format!("/api/projects/metrics/{}", metric_id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .delete(&format!("/api/projects/task-groups/{}", group_id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let project: Value = server.get("/api/projects/p").await.json();
    assert_eq!(project["taskGroups"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_task_group_under_missing_project_is_not_found() {
    let server = create_test_server().await;

    let response = server
        .post("/api/projects/missing/task-groups")
        .json(&json!({ "name": "Orphan" }))
        .await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"], "Project not found");
}

#[tokio::test]
async fn test_delete_missing_metric_is_not_found() {
    let server = create_test_server().await;

    let response = server.delete("/api/projects/metrics/missing").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"], "Metric not found");
}

// ============ Employee Endpoint Tests ============

#[tokio::test]
async fn test_create_employee_returns_both_shapes() {
    let server = create_test_server().await;
    create_sample_project(&server).await;

    let body = create_sample_employee(&server).await;

    assert_eq!(body["assignedProjects"], json!(["p"]));
    assert_eq!(body["assignedCountriesByProject"]["p"], json!(["A", "B"]));
    assert_eq!(body["defaultProjectId"], "p");
    assert_eq!(body["assignedCountries"], json!(["A", "B"]));
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn test_create_employee_with_legacy_shape() {
    let server = create_test_server().await;
    create_sample_project(&server).await;

    let response = server
        .post("/api/employees")
        .json(&json!({
            "name": "Lee",
            "defaultProjectId": "p",
            "assignedCountries": ["B"]
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["assignedProjects"], json!(["p"]));
    assert_eq!(body["assignedCountriesByProject"]["p"], json!(["B"]));
}

#[tokio::test]
async fn test_employee_country_outside_project_is_rejected() {
    let server = create_test_server().await;
    create_sample_project(&server).await;

    let response = server
        .post("/api/employees")
        .json(&json!({
            "name": "Lee",
            "assignedProjects": ["p"],
            "assignedCountriesByProject": { "p": ["Z"] }
        }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_list_employees_by_project() {
    let server = create_test_server().await;
    create_sample_project(&server).await;
    create_sample_employee(&server).await;
    server
        .post("/api/employees")
        .json(&json!({ "name": "Unassigned" }))
        .await
        .assert_status(StatusCode::CREATED);

    let all: Vec<Value> = server.get("/api/employees").await.json();
    assert_eq!(all.len(), 2);

    let assigned: Vec<Value> = server
        .get("/api/employees")
        .add_query_param("projectId", "p")
        .await
        .json();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0]["id"], "e");

    let unfiltered: Vec<Value> = server
        .get("/api/employees")
        .add_query_param("projectId", "")
        .await
        .json();
    assert_eq!(unfiltered.len(), 2);
}

#[tokio::test]
async fn test_update_employee() {
    let server = create_test_server().await;
    create_sample_project(&server).await;
    create_sample_employee(&server).await;

    let response = server
        .put("/api/employees/e")
        .json(&json!({ "assignedCountries": ["A"], "annualWorkingHours": 1600 }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "Dana");
    assert_eq!(body["assignedCountriesByProject"]["p"], json!(["A"]));
    assert_eq!(body["annualWorkingHours"], 1600.0);
}

#[tokio::test]
async fn test_get_employee_not_found() {
    let server = create_test_server().await;

    let response = server.get("/api/employees/missing").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"], "Employee not found");
}

// ============ Capacity Endpoint Tests ============

#[tokio::test]
async fn test_capacity_totals_scenario() {
    let server = create_test_server().await;
    create_sample_project(&server).await;
    create_sample_employee(&server).await;

    let entry = put_capacity(&server, "A", "m1", json!(2), json!(3)).await;
    assert_eq!(entry["total"], 6.0);
    put_capacity(&server, "A", "m2", json!(1), json!(1)).await;
    put_capacity(&server, "B", "m1", json!(0.5), json!(12)).await;

    let tg = total(
        &server,
        "/api/capacity/totals/task-group",
        &[("employeeId", "e"), ("projectId", "p"), ("country", "A"), ("taskGroupId", "t")],
    )
    .await;
    assert_eq!(tg, 7.0);

    let country_b = total(
        &server,
        "/api/capacity/totals/country",
        &[("employeeId", "e"), ("projectId", "p"), ("country", "B")],
    )
    .await;
    assert_eq!(country_b, 6.0);

    let project = total(
        &server,
        "/api/capacity/totals/project",
        &[("employeeId", "e"), ("projectId", "p")],
    )
    .await;
    assert_eq!(project, 13.0);
}

#[tokio::test]
async fn test_capacity_upsert_overwrites_cell() {
    let server = create_test_server().await;
    create_sample_project(&server).await;
    create_sample_employee(&server).await;

    let first = put_capacity(&server, "A", "m1", json!(2), json!(3)).await;
    let second = put_capacity(&server, "A", "m1", json!("4"), json!("abc")).await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["timePerUnit"], 4.0);
    assert_eq!(second["count"], 0.0);
    assert_eq!(second["total"], 0.0);

    let entries: Vec<Value> = server
        .get("/api/capacity")
        .add_query_param("employeeId", "e")
        .await
        .json();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_capacity_entry_lookup() {
    let server = create_test_server().await;
    create_sample_project(&server).await;
    create_sample_employee(&server).await;
    put_capacity(&server, "A", "m1", json!(2), json!(3)).await;

    let response = server
        .get("/api/capacity/entry")
        .add_query_param("employeeId", "e")
        .add_query_param("projectId", "p")
        .add_query_param("country", "A")
        .add_query_param("taskGroupId", "t")
        .add_query_param("metricId", "m1")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total"], 6.0);

    let response = server
        .get("/api/capacity/entry")
        .add_query_param("employeeId", "e")
        .add_query_param("projectId", "p")
        .add_query_param("country", "B")
        .add_query_param("taskGroupId", "t")
        .add_query_param("metricId", "m1")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body.is_null());

    let response = server
        .get("/api/capacity/entry")
        .add_query_param("employeeId", "e")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body.is_null());
}

#[tokio::test]
async fn test_totals_with_missing_params_are_zero() {
    let server = create_test_server().await;
    create_sample_project(&server).await;
    create_sample_employee(&server).await;
    put_capacity(&server, "A", "m1", json!(2), json!(3)).await;

    let project = total(&server, "/api/capacity/totals/project", &[("employeeId", "e")]).await;
    assert_eq!(project, 0.0);
}

#[tokio::test]
async fn test_delete_capacity_by_employee_and_project() {
    let server = create_test_server().await;
    create_sample_project(&server).await;
    create_sample_employee(&server).await;
    put_capacity(&server, "A", "m1", json!(2), json!(3)).await;
    put_capacity(&server, "B", "m2", json!(1), json!(1)).await;

    server
        .delete("/api/capacity/employee/e")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let entries: Vec<Value> = server.get("/api/capacity").await.json();
    assert!(entries.is_empty());

    put_capacity(&server, "A", "m1", json!(2), json!(3)).await;
    server
        .delete("/api/capacity/project/p")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let entries: Vec<Value> = server.get("/api/capacity").await.json();
    assert!(entries.is_empty());

    // Deleting nothing still succeeds
    server
        .delete("/api/capacity/project/p")
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_project_delete_cascades_to_capacity_and_assignments() {
    let server = create_test_server().await;
    create_sample_project(&server).await;
    create_sample_employee(&server).await;
    put_capacity(&server, "A", "m1", json!(2), json!(3)).await;

    server
        .delete("/api/projects/p")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let entries: Vec<Value> = server.get("/api/capacity").await.json();
    assert!(entries.is_empty());

    let employee: Value = server.get("/api/employees/e").await.json();
    assert_eq!(employee["assignedProjects"], json!([]));
    assert_eq!(employee["defaultProjectId"], "");
}

#[tokio::test]
async fn test_employee_delete_cascades_to_capacity() {
    let server = create_test_server().await;
    create_sample_project(&server).await;
    create_sample_employee(&server).await;
    put_capacity(&server, "A", "m1", json!(2), json!(3)).await;

    server
        .delete("/api/employees/e")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let entries: Vec<Value> = server.get("/api/capacity").await.json();
    assert!(entries.is_empty());
}

// ============ Export / Import Tests ============

#[tokio::test]
async fn test_export_then_import_into_fresh_server() {
    let source = create_test_server().await;
    create_sample_project(&source).await;
    create_sample_employee(&source).await;
    put_capacity(&source, "A", "m1", json!(2), json!(3)).await;

    let response = source.get("/api/export").await;
    response.assert_status_ok();
    let exported: Value = response.json();
    assert_eq!(exported["projects"].as_array().unwrap().len(), 1);
    assert!(exported["exportedAt"].is_string());

    let target = create_test_server().await;
    let response = target.post("/api/import").json(&exported).await;
    response.assert_status_ok();
    let summary: Value = response.json();
    assert_eq!(summary, json!({ "projects": 1, "employees": 1, "capacity": 1 }));

    let project = total(
        &target,
        "/api/capacity/totals/project",
        &[("employeeId", "e"), ("projectId", "p")],
    )
    .await;
    assert_eq!(project, 6.0);

    let employee: Value = target.get("/api/employees/e").await.json();
    let original: Value = source.get("/api/employees/e").await.json();
    assert_eq!(employee["createdAt"], original["createdAt"]);
}

#[tokio::test]
async fn test_import_with_invalid_assignment_changes_nothing() {
    let server = create_test_server().await;

    let response = server
        .post("/api/import")
        .json(&json!({
            "projects": [{ "id": "p", "name": "P", "countries": ["A"] }],
            "employees": [{
                "id": "e",
                "name": "Dana",
                "assignedProjects": ["p"],
                "assignedCountriesByProject": { "p": ["Z"] }
            }]
        }))
        .await;

    response.assert_status_bad_request();
    let projects: Vec<Value> = server.get("/api/projects").await.json();
    assert!(projects.is_empty());
}

// ============ Request Body Tests ============

#[tokio::test]
async fn test_create_project_with_null_lists() {
    let server = create_test_server().await;

    let response = server
        .post("/api/projects")
        .json(&json!({
            "id": "p",
            "name": "P",
            "countries": null,
            "countryPlatforms": null,
            "taskGroups": [{ "id": "t", "name": "T", "metrics": null }]
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["countries"], json!([]));
    assert_eq!(body["taskGroups"][0]["id"], "t");
    assert_eq!(body["taskGroups"][0]["metrics"], json!([]));
}

#[tokio::test]
async fn test_malformed_body_uses_error_shape() {
    let server = create_test_server().await;

    let response = server
        .post("/api/projects")
        .json(&json!({ "name": "P", "countries": 5 }))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].is_string());

    let response = server
        .post("/api/employees")
        .text("not json")
        .content_type("application/json")
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_import_with_null_sections() {
    let server = create_test_server().await;

    let response = server
        .post("/api/import")
        .json(&json!({
            "projects": [{ "id": "p", "name": "P", "countries": null }],
            "employees": null,
            "capacity": null
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["projects"], 1);
    assert_eq!(body["employees"], 0);
    assert_eq!(body["capacity"], 0);
}

#[tokio::test]
async fn test_update_employee_null_hours_clears_them() {
    let server = create_test_server().await;
    create_sample_project(&server).await;
    create_sample_employee(&server).await;
    server
        .put("/api/employees/e")
        .json(&json!({ "annualWorkingHours": 1600 }))
        .await
        .assert_status_ok();

    let response = server
        .put("/api/employees/e")
        .json(&json!({ "name": "Dana K" }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["annualWorkingHours"], 1600.0);

    let response = server
        .put("/api/employees/e")
        .json(&json!({ "annualWorkingHours": null }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["annualWorkingHours"].is_null());
}

#[tokio::test]
async fn test_capacity_for_unknown_employee_hides_storage_detail() {
    let server = create_test_server().await;
    create_sample_project(&server).await;

    let response = server
        .post("/api/capacity")
        .json(&json!({
            "employeeId": "ghost",
            "projectId": "p",
            "country": "A",
            "taskGroupId": "t",
            "metricId": "m1",
            "timePerUnit": 1,
            "count": 1
        }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let text = response.text();
    assert!(!text.contains("FOREIGN KEY"));
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to update capacity");
    assert_eq!(body["code"], "INTERNAL_ERROR");
}
