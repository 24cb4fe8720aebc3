//! Employee and assignment rows

use capacity_core::{Assignments, Employee};
use rusqlite::Row;

use super::{json_or_default, timestamp_or_epoch};

/// Row of `employees`
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRow {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub annual_working_hours: Option<f64>,
    pub created_at: Option<String>,
}

impl EmployeeRow {
    pub const COLUMNS: &'static str = "id, name, email, annual_working_hours, created_at";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            annual_working_hours: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    pub fn into_domain(self, assignments: Assignments) -> Employee {
        Employee {
            id: self.id,
            name: self.name,
            email: self.email.filter(|e| !e.is_empty()),
            assignments,
            annual_working_hours: self.annual_working_hours,
            created_at: timestamp_or_epoch(self.created_at.as_deref()),
        }
    }
}

/// Row of `employee_projects`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentRow {
    pub employee_id: String,
    pub project_id: String,
    pub position: i64,
    pub countries_json: String,
}

impl AssignmentRow {
    pub const COLUMNS: &'static str = "employee_id, project_id, position, countries";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            employee_id: row.get(0)?,
            project_id: row.get(1)?,
            position: row.get(2)?,
            countries_json: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        })
    }

    pub fn countries(&self) -> Vec<String> {
        json_or_default(&self.countries_json)
    }
}
