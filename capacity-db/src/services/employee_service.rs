//! Employee Store Service Implementation
//!
//! Implements the EmployeeStore trait. Assignments are validated against
//! the stored projects inside the same transaction that writes them.

use async_trait::async_trait;
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use capacity_core::ids;
use capacity_core::store::{EmployeeStore, Store};
use capacity_core::{
    coerce_number, Assignments, Employee, EmployeeUpdate, EntityKind, NewEmployee, StoreResult,
};

use crate::entities::{format_timestamp, now_timestamp, EmployeeRow};
use crate::error::{DbError, DbResult};
use crate::repos::{AssignmentRepo, CapacityDatabase, EmployeeRepo, ProjectRepo, WriteMode};
use crate::validation::{name_or_keep, validate_assignments, validate_name};

/// Employee Store Service
pub struct EmployeeService {
    database: Arc<CapacityDatabase>,
}

impl EmployeeService {
    /// Create a new Employee Service
    pub fn new(database: Arc<CapacityDatabase>) -> Self {
        Self { database }
    }
}

fn check_assignments(conn: &Connection, assignments: &Assignments) -> DbResult<()> {
    let projects = ProjectRepo::new(conn);
    validate_assignments(assignments, |project_id| {
        Ok(projects.get(project_id)?.map(|row| row.countries()))
    })
}

/// Write an employee and its assignments. Callers own the transaction.
/// Returns the employee id.
pub(crate) fn write_employee(
    conn: &Connection,
    employee: NewEmployee,
    mode: WriteMode,
) -> DbResult<String> {
    let name = validate_name(EntityKind::Employee, employee.name)?;
    let assignments = employee.assignments.resolve(None).unwrap_or_default();
    check_assignments(conn, &assignments)?;

    let row = EmployeeRow {
        id: ids::or_generate(employee.id, ids::employee_id),
        name,
        email: employee.email.filter(|e| !e.is_empty()),
        annual_working_hours: employee
            .annual_working_hours
            .as_ref()
            .map(|v| coerce_number(Some(v))),
        created_at: Some(
            employee
                .created_at
                .map(format_timestamp)
                .unwrap_or_else(now_timestamp),
        ),
    };
    EmployeeRepo::new(conn).write(&row, mode)?;
    AssignmentRepo::new(conn).replace(&row.id, &assignments)?;
    Ok(row.id)
}

#[async_trait]
impl Store for EmployeeService {
    fn name(&self) -> &'static str {
        "employees"
    }

    async fn verify_integrity(&self) -> StoreResult<bool> {
        let consistent = self
            .database
            .call(|conn| {
                let countries_by_project: HashMap<String, Vec<String>> = ProjectRepo::new(conn)
                    .list()?
                    .into_iter()
                    .map(|row| (row.id.clone(), row.countries()))
                    .collect();
                for row in AssignmentRepo::new(conn).list_all()? {
                    let Some(allowed) = countries_by_project.get(&row.project_id) else {
                        return Ok(false);
                    };
                    if row.countries().iter().any(|c| !allowed.contains(c)) {
                        debug!(
                            employee_id = %row.employee_id,
                            project_id = %row.project_id,
                            "Assignment countries outside project countries"
                        );
                        return Ok(false);
                    }
                }
                Ok(true)
            })
            .await?;
        Ok(consistent)
    }
}

#[async_trait]
impl EmployeeStore for EmployeeService {
    async fn create_employee(&self, employee: NewEmployee) -> StoreResult<Employee> {
        let created = self
            .database
            .transaction(|conn| {
                let id = write_employee(conn, employee, WriteMode::Insert)?;
                EmployeeRepo::new(conn)
                    .load(&id)?
                    .ok_or_else(|| DbError::not_found(EntityKind::Employee, id))
            })
            .await?;

        info!(
            employee_id = %created.id,
            projects = created.assignments.len(),
            "Employee created"
        );
        Ok(created)
    }

    async fn get_employee(&self, id: &str) -> StoreResult<Option<Employee>> {
        let id = id.to_string();
        debug!(employee_id = %id, "Loading employee");
        Ok(self
            .database
            .call(move |conn| EmployeeRepo::new(conn).load(&id))
            .await?)
    }

    async fn list_employees(&self, project_id: Option<&str>) -> StoreResult<Vec<Employee>> {
        let project_id = project_id.map(str::to_string);
        Ok(self
            .database
            .call(move |conn| EmployeeRepo::new(conn).load_all(project_id.as_deref()))
            .await?)
    }

    async fn update_employee(&self, id: &str, update: EmployeeUpdate) -> StoreResult<Employee> {
        let id = id.to_string();
        let updated = self
            .database
            .transaction(move |conn| {
                let employees = EmployeeRepo::new(conn);
                let current = employees
                    .load(&id)?
                    .ok_or_else(|| DbError::not_found(EntityKind::Employee, id.clone()))?;

                let row = EmployeeRow {
                    id: id.clone(),
                    name: name_or_keep(update.name, current.name.clone()),
                    email: match update.email {
                        Some(email) => Some(email).filter(|e| !e.is_empty()),
                        None => current.email.clone(),
                    },
                    annual_working_hours: match update.annual_working_hours {
                        Some(Some(v)) => Some(coerce_number(Some(&v))),
                        Some(None) => None,
                        None => current.annual_working_hours,
                    },
                    created_at: None,
                };
                employees.update(&row)?;

                if let Some(assignments) = update.assignments.resolve(Some(&current.assignments)) {
                    if assignments != current.assignments {
                        check_assignments(conn, &assignments)?;
                        AssignmentRepo::new(conn).replace(&id, &assignments)?;
                    }
                }

                employees
                    .load(&id)?
                    .ok_or_else(|| DbError::not_found(EntityKind::Employee, id))
            })
            .await?;

        info!(employee_id = %updated.id, "Employee updated");
        Ok(updated)
    }

    async fn delete_employee(&self, id: &str) -> StoreResult<()> {
        let id = id.to_string();
        let removed = {
            let id = id.clone();
            self.database
                .call(move |conn| EmployeeRepo::new(conn).delete(&id))
                .await?
        };
        if removed == 0 {
            return Err(DbError::not_found(EntityKind::Employee, id).into());
        }
        info!(employee_id = %id, "Employee deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ProjectService;
    use capacity_core::store::ProjectStore;
    use capacity_core::{AssignmentInput, NewProject, ProjectUpdate, StoreError};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    async fn setup() -> (ProjectService, EmployeeService) {
        let db = Arc::new(CapacityDatabase::connect_in_memory().await.unwrap());
        let projects = ProjectService::new(db.clone());
        for (id, countries) in [("p1", &["A", "B"][..]), ("p2", &["C"][..])] {
            projects
                .create_project(NewProject {
                    id: Some(id.to_string()),
                    name: id.to_uppercase(),
                    countries: strings(countries),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        (projects, EmployeeService::new(db))
    }

    fn legacy(name: &str, project: &str, countries: &[&str]) -> NewEmployee {
        NewEmployee {
            name: name.to_string(),
            assignments: AssignmentInput {
                default_project_id: Some(project.to_string()),
                assigned_countries: Some(strings(countries)),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_from_legacy_shape() {
        let (_, service) = setup().await;
        let employee = service
            .create_employee(legacy("Ana", "p1", &["A"]))
            .await
            .unwrap();

        assert!(employee.id.starts_with("emp_"));
        assert_eq!(employee.assignments.project_ids(), strings(&["p1"]));
        assert_eq!(employee.assignments.countries_for("p1"), Some(strings(&["A"]).as_slice()));
        assert_eq!(employee.email, None);
    }

    #[tokio::test]
    async fn test_create_from_new_shape_derives_legacy() {
        let (_, service) = setup().await;
        let mut by_project = BTreeMap::new();
        by_project.insert("p1".to_string(), strings(&["B"]));
        by_project.insert("p2".to_string(), strings(&["C"]));
        let employee = service
            .create_employee(NewEmployee {
                name: "Ben".to_string(),
                email: Some("ben@example.com".to_string()),
                assignments: AssignmentInput {
                    assigned_projects: Some(strings(&["p2", "p1"])),
                    assigned_countries_by_project: Some(by_project),
                    ..Default::default()
                },
                annual_working_hours: Some(json!("1720")),
                ..Default::default()
            })
            .await
            .unwrap();

        let legacy = employee.legacy_view();
        assert_eq!(legacy.default_project_id, "p2");
        assert_eq!(legacy.assigned_countries, strings(&["C"]));
        assert_eq!(employee.annual_working_hours, Some(1720.0));
        assert_eq!(employee.email.as_deref(), Some("ben@example.com"));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_assignments() {
        let (_, service) = setup().await;
        let err = service
            .create_employee(legacy("Cy", "p1", &["C"]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let err = service
            .create_employee(legacy("Cy", "ghost", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let err = service
            .create_employee(NewEmployee::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(service.list_employees(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_unspecified_fields() {
        let (_, service) = setup().await;
        let mut input = legacy("Dee", "p1", &["A", "B"]);
        input.email = Some("dee@example.com".to_string());
        input.annual_working_hours = Some(json!(1600));
        let employee = service.create_employee(input).await.unwrap();

        let updated = service
            .update_employee(
                &employee.id,
                EmployeeUpdate {
                    name: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated, employee);

        let updated = service
            .update_employee(
                &employee.id,
                EmployeeUpdate {
                    assignments: AssignmentInput {
                        assigned_countries: Some(strings(&["B"])),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.assignments.countries_for("p1"), Some(strings(&["B"]).as_slice()));
        assert_eq!(updated.created_at, employee.created_at);
    }

    #[tokio::test]
    async fn test_update_null_hours_clears_them() {
        let (_, service) = setup().await;
        let mut input = legacy("Dee", "p1", &["A"]);
        input.annual_working_hours = Some(json!(1600));
        let employee = service.create_employee(input).await.unwrap();

        let update: EmployeeUpdate =
            serde_json::from_value(json!({ "name": "Dee" })).unwrap();
        let kept = service.update_employee(&employee.id, update).await.unwrap();
        assert_eq!(kept.annual_working_hours, Some(1600.0));

        let update: EmployeeUpdate =
            serde_json::from_value(json!({ "annualWorkingHours": null })).unwrap();
        let cleared = service.update_employee(&employee.id, update).await.unwrap();
        assert_eq!(cleared.annual_working_hours, None);
        assert_eq!(cleared.name, "Dee");
    }

    #[tokio::test]
    async fn test_update_missing_employee_is_not_found() {
        let (_, service) = setup().await;
        let err = service
            .update_employee("ghost", EmployeeUpdate::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_filters_by_project() {
        let (_, service) = setup().await;
        service.create_employee(legacy("Eve", "p1", &[])).await.unwrap();
        service.create_employee(legacy("Fay", "p2", &["C"])).await.unwrap();

        let names: Vec<String> = service
            .list_employees(Some("p2"))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Fay"]);
        assert_eq!(service.list_employees(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_narrowing_project_countries_narrows_assignments() {
        let (projects, service) = setup().await;
        let employee = service
            .create_employee(legacy("Gus", "p1", &["A", "B"]))
            .await
            .unwrap();

        projects
            .update_project(
                "p1",
                ProjectUpdate {
                    countries: Some(strings(&["B"])),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let employee = service.get_employee(&employee.id).await.unwrap().unwrap();
        assert_eq!(employee.assignments.countries_for("p1"), Some(strings(&["B"]).as_slice()));
        assert!(service.verify_integrity().await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_employee() {
        let (_, service) = setup().await;
        let employee = service.create_employee(legacy("Hal", "p1", &[])).await.unwrap();
        service.delete_employee(&employee.id).await.unwrap();
        assert_eq!(service.get_employee(&employee.id).await.unwrap(), None);
        assert!(service.delete_employee(&employee.id).await.unwrap_err().is_not_found());
    }
}
