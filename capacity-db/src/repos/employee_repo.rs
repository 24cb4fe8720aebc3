//! Employee and assignment repositories

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

use capacity_core::{Assignments, Employee, ProjectAssignment};

use super::WriteMode;
use crate::entities::{AssignmentRow, EmployeeRow};
use crate::error::DbResult;

/// Employee repository
pub struct EmployeeRepo<'c> {
    conn: &'c Connection,
}

impl<'c> EmployeeRepo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn write(&self, row: &EmployeeRow, mode: WriteMode) -> DbResult<()> {
        let sql = match mode {
            WriteMode::Insert => {
                "INSERT INTO employees (id, name, email, annual_working_hours, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)"
            }
            WriteMode::Upsert => {
                "INSERT INTO employees (id, name, email, annual_working_hours, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    email = excluded.email,
                    annual_working_hours = excluded.annual_working_hours,
                    created_at = excluded.created_at"
            }
        };
        self.conn.execute(
            sql,
            params![
                row.id,
                row.name,
                row.email.as_deref().unwrap_or(""),
                row.annual_working_hours,
                row.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> DbResult<Option<EmployeeRow>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM employees WHERE id = ?1", EmployeeRow::COLUMNS),
                params![id],
                EmployeeRow::from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn list(&self) -> DbResult<Vec<EmployeeRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM employees ORDER BY rowid",
            EmployeeRow::COLUMNS
        ))?;
        let rows = stmt
            .query_map([], EmployeeRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Employees with an assignment to `project_id`
    pub fn list_for_project(&self, project_id: &str) -> DbResult<Vec<EmployeeRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.id, e.name, e.email, e.annual_working_hours, e.created_at
             FROM employees e
             JOIN employee_projects ep ON ep.employee_id = e.id
             WHERE ep.project_id = ?1
             ORDER BY e.rowid",
        )?;
        let rows = stmt
            .query_map(params![project_id], EmployeeRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn update(&self, row: &EmployeeRow) -> DbResult<usize> {
        Ok(self.conn.execute(
            "UPDATE employees SET name = ?2, email = ?3, annual_working_hours = ?4 WHERE id = ?1",
            params![
                row.id,
                row.name,
                row.email.as_deref().unwrap_or(""),
                row.annual_working_hours,
            ],
        )?)
    }

    /// Returns the number of employee rows removed; assignments and
    /// capacity cascade
    pub fn delete(&self, id: &str) -> DbResult<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM employees WHERE id = ?1", params![id])?)
    }

    pub fn load(&self, id: &str) -> DbResult<Option<Employee>> {
        let Some(row) = self.get(id)? else {
            return Ok(None);
        };
        let assignments = AssignmentRepo::new(self.conn).for_employee(&row.id)?;
        Ok(Some(row.into_domain(assignments)))
    }

    /// Load employees, optionally only those assigned to a project
    pub fn load_all(&self, project_id: Option<&str>) -> DbResult<Vec<Employee>> {
        let rows = match project_id {
            Some(project_id) => self.list_for_project(project_id)?,
            None => self.list()?,
        };
        let mut assignments = AssignmentRepo::new(self.conn).all_by_employee()?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let a = assignments.remove(&row.id).unwrap_or_default();
                row.into_domain(a)
            })
            .collect())
    }
}

/// Employee→project assignment repository
pub struct AssignmentRepo<'c> {
    conn: &'c Connection,
}

impl<'c> AssignmentRepo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Replace every assignment of an employee
    pub fn replace(&self, employee_id: &str, assignments: &Assignments) -> DbResult<()> {
        self.conn.execute(
            "DELETE FROM employee_projects WHERE employee_id = ?1",
            params![employee_id],
        )?;
        let mut stmt = self.conn.prepare(
            "INSERT INTO employee_projects (employee_id, project_id, position, countries)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (position, assignment) in assignments.iter().enumerate() {
            stmt.execute(params![
                employee_id,
                assignment.project_id,
                position as i64,
                serde_json::to_string(&assignment.countries)?,
            ])?;
        }
        Ok(())
    }

    pub fn for_employee(&self, employee_id: &str) -> DbResult<Assignments> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM employee_projects WHERE employee_id = ?1 ORDER BY position",
            AssignmentRow::COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![employee_id], AssignmentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(to_assignments(rows))
    }

    pub fn list_all(&self) -> DbResult<Vec<AssignmentRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM employee_projects ORDER BY employee_id, position",
            AssignmentRow::COLUMNS
        ))?;
        let rows = stmt
            .query_map([], AssignmentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn all_by_employee(&self) -> DbResult<HashMap<String, Assignments>> {
        let mut grouped: HashMap<String, Vec<AssignmentRow>> = HashMap::new();
        for row in self.list_all()? {
            grouped.entry(row.employee_id.clone()).or_default().push(row);
        }
        Ok(grouped
            .into_iter()
            .map(|(employee_id, rows)| (employee_id, to_assignments(rows)))
            .collect())
    }

    /// Drop countries outside `allowed` from every assignment to a project.
    /// Returns the number of assignments changed.
    pub fn narrow_to(&self, project_id: &str, allowed: &[String]) -> DbResult<usize> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM employee_projects WHERE project_id = ?1",
            AssignmentRow::COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![project_id], AssignmentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut changed = 0;
        for row in rows {
            let countries = row.countries();
            let kept: Vec<String> = countries
                .iter()
                .filter(|c| allowed.contains(c))
                .cloned()
                .collect();
            if kept.len() != countries.len() {
                self.conn.execute(
                    "UPDATE employee_projects SET countries = ?3
                     WHERE employee_id = ?1 AND project_id = ?2",
                    params![row.employee_id, row.project_id, serde_json::to_string(&kept)?],
                )?;
                changed += 1;
            }
        }
        Ok(changed)
    }
}

fn to_assignments(rows: Vec<AssignmentRow>) -> Assignments {
    Assignments::new(
        rows.into_iter()
            .map(|row| ProjectAssignment {
                countries: row.countries(),
                project_id: row.project_id,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{now_timestamp, ProjectRow};
    use crate::repos::ProjectRepo;
    use capacity_core::CountryPlatforms;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn setup() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        crate::schema::apply(&mut conn).unwrap();
        let projects = ProjectRepo::new(&conn);
        for id in ["p1", "p2"] {
            let row = ProjectRow::new(
                id.to_string(),
                id.to_uppercase(),
                &strings(&["A", "B", "C"]),
                &CountryPlatforms::new(),
            )
            .unwrap();
            projects.write(&row, WriteMode::Insert).unwrap();
        }
        conn
    }

    fn employee_row(id: &str) -> EmployeeRow {
        EmployeeRow {
            id: id.to_string(),
            name: format!("Employee {}", id),
            email: None,
            annual_working_hours: Some(1600.0),
            created_at: Some(now_timestamp()),
        }
    }

    #[test]
    fn test_assignments_keep_order() {
        let conn = setup();
        EmployeeRepo::new(&conn)
            .write(&employee_row("e1"), WriteMode::Insert)
            .unwrap();
        let assignments = Assignments::new(vec![
            ProjectAssignment {
                project_id: "p2".to_string(),
                countries: strings(&["C"]),
            },
            ProjectAssignment {
                project_id: "p1".to_string(),
                countries: strings(&["A", "B"]),
            },
        ]);
        AssignmentRepo::new(&conn).replace("e1", &assignments).unwrap();

        let employee = EmployeeRepo::new(&conn).load("e1").unwrap().unwrap();
        assert_eq!(employee.assignments, assignments);
        assert_eq!(employee.legacy_view().default_project_id, "p2");
        assert_eq!(employee.annual_working_hours, Some(1600.0));
    }

    #[test]
    fn test_load_all_filters_by_project() {
        let conn = setup();
        let employees = EmployeeRepo::new(&conn);
        let assignments = AssignmentRepo::new(&conn);
        for id in ["e1", "e2", "e3"] {
            employees.write(&employee_row(id), WriteMode::Insert).unwrap();
        }
        assignments
            .replace("e1", &Assignments::from_legacy("p1", strings(&["A"])))
            .unwrap();
        assignments
            .replace("e3", &Assignments::from_legacy("p1", Vec::new()))
            .unwrap();

        let ids: Vec<String> = employees
            .load_all(Some("p1"))
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["e1", "e3"]);
        assert_eq!(employees.load_all(None).unwrap().len(), 3);
        assert!(employees.load_all(Some("p2")).unwrap().is_empty());
    }

    #[test]
    fn test_narrow_to_drops_removed_countries() {
        let conn = setup();
        EmployeeRepo::new(&conn)
            .write(&employee_row("e1"), WriteMode::Insert)
            .unwrap();
        let assignments = AssignmentRepo::new(&conn);
        assignments
            .replace("e1", &Assignments::from_legacy("p1", strings(&["A", "B"])))
            .unwrap();

        assert_eq!(assignments.narrow_to("p1", &strings(&["B", "C"])).unwrap(), 1);
        assert_eq!(
            assignments.for_employee("e1").unwrap().countries_for("p1"),
            Some(strings(&["B"]).as_slice())
        );
        assert_eq!(assignments.narrow_to("p1", &strings(&["B", "C"])).unwrap(), 0);
    }

    #[test]
    fn test_deleting_project_removes_assignment() {
        let conn = setup();
        EmployeeRepo::new(&conn)
            .write(&employee_row("e1"), WriteMode::Insert)
            .unwrap();
        AssignmentRepo::new(&conn)
            .replace("e1", &Assignments::from_legacy("p1", strings(&["A"])))
            .unwrap();

        ProjectRepo::new(&conn).delete("p1").unwrap();
        assert!(AssignmentRepo::new(&conn).for_employee("e1").unwrap().is_empty());
        assert!(EmployeeRepo::new(&conn).get("e1").unwrap().is_some());
    }
}
