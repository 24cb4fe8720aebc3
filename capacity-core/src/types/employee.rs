//! Employee types
//!
//! An employee is assigned to an ordered list of projects and, per project,
//! to a subset of that project's countries. [`Assignments`] is the only
//! stored representation. The older single-project shape
//! (`defaultProjectId` + `assignedCountries`) is accepted on write through
//! [`AssignmentInput`] and derived on read through [`Assignments::legacy_view`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::common::{null_as_clear, null_as_default};

/// One project assignment with the countries covered in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAssignment {
    pub project_id: String,
    #[serde(default)]
    pub countries: Vec<String>,
}

/// Single-project view of an employee's assignments
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LegacyAssignment {
    pub default_project_id: String,
    pub assigned_countries: Vec<String>,
}

/// Ordered project assignments, unique per project
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignments(Vec<ProjectAssignment>);

impl Assignments {
    /// Build from a list, dropping blank or repeated projects and repeated countries
    pub fn new(list: Vec<ProjectAssignment>) -> Self {
        let mut out: Vec<ProjectAssignment> = Vec::with_capacity(list.len());
        for assignment in list {
            if assignment.project_id.trim().is_empty()
                || out.iter().any(|a| a.project_id == assignment.project_id)
            {
                continue;
            }
            out.push(ProjectAssignment {
                project_id: assignment.project_id,
                countries: crate::types::dedup_countries(assignment.countries),
            });
        }
        Self(out)
    }

    /// Build from the single-project shape; an empty project id means no assignment
    pub fn from_legacy(default_project_id: &str, assigned_countries: Vec<String>) -> Self {
        Self::new(vec![ProjectAssignment {
            project_id: default_project_id.to_string(),
            countries: assigned_countries,
        }])
    }

    /// Build from the multi-project shape. Projects named only in the
    /// country map are appended after the ordered list.
    pub fn from_parts(
        projects: Vec<String>,
        mut countries_by_project: BTreeMap<String, Vec<String>>,
    ) -> Self {
        let mut list: Vec<ProjectAssignment> = projects
            .into_iter()
            .map(|project_id| {
                let countries = countries_by_project.remove(&project_id).unwrap_or_default();
                ProjectAssignment {
                    project_id,
                    countries,
                }
            })
            .collect();
        list.extend(
            countries_by_project
                .into_iter()
                .map(|(project_id, countries)| ProjectAssignment {
                    project_id,
                    countries,
                }),
        );
        Self::new(list)
    }

    /// Derive the single-project view from the first assignment
    pub fn legacy_view(&self) -> LegacyAssignment {
        self.0
            .first()
            .map(|a| LegacyAssignment {
                default_project_id: a.project_id.clone(),
                assigned_countries: a.countries.clone(),
            })
            .unwrap_or_default()
    }

    pub fn project_ids(&self) -> Vec<String> {
        self.0.iter().map(|a| a.project_id.clone()).collect()
    }

    pub fn countries_by_project(&self) -> BTreeMap<String, Vec<String>> {
        self.0
            .iter()
            .map(|a| (a.project_id.clone(), a.countries.clone()))
            .collect()
    }

    pub fn countries_for(&self, project_id: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|a| a.project_id == project_id)
            .map(|a| a.countries.as_slice())
    }

    pub fn contains_project(&self, project_id: &str) -> bool {
        self.0.iter().any(|a| a.project_id == project_id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProjectAssignment> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_inner(self) -> Vec<ProjectAssignment> {
        self.0
    }

    /// Replace the countries of the first assignment, if there is one
    fn with_first_countries(mut self, countries: Vec<String>) -> Self {
        if let Some(first) = self.0.first_mut() {
            first.countries = crate::types::dedup_countries(countries);
        }
        self
    }
}

/// Assignment fields as clients send them: either shape, all optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentInput {
    pub assigned_projects: Option<Vec<String>>,
    pub assigned_countries_by_project: Option<BTreeMap<String, Vec<String>>>,
    pub default_project_id: Option<String>,
    pub assigned_countries: Option<Vec<String>>,
}

impl AssignmentInput {
    /// Whether no assignment field was supplied
    pub fn is_empty(&self) -> bool {
        self.assigned_projects.is_none()
            && self.assigned_countries_by_project.is_none()
            && self.default_project_id.is_none()
            && self.assigned_countries.is_none()
    }

    /// Resolve into canonical assignments.
    ///
    /// The multi-project fields win when either is present. Otherwise the
    /// legacy pair is used; `assignedCountries` without `defaultProjectId`
    /// rewrites the countries of the current first project. Returns `None`
    /// when nothing was supplied and there is nothing to keep.
    pub fn resolve(self, current: Option<&Assignments>) -> Option<Assignments> {
        if self.assigned_projects.is_some() || self.assigned_countries_by_project.is_some() {
            return Some(Assignments::from_parts(
                self.assigned_projects.unwrap_or_default(),
                self.assigned_countries_by_project.unwrap_or_default(),
            ));
        }
        match (self.default_project_id, self.assigned_countries) {
            (Some(project_id), countries) => Some(Assignments::from_legacy(
                &project_id,
                countries.unwrap_or_default(),
            )),
            (None, Some(countries)) => {
                current.map(|c| c.clone().with_first_countries(countries))
            }
            (None, None) => current.cloned(),
        }
    }
}

/// Employee as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "EmployeeRecord", from = "EmployeeRecord")]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub assignments: Assignments,
    pub annual_working_hours: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Employee {
    pub fn legacy_view(&self) -> LegacyAssignment {
        self.assignments.legacy_view()
    }

    pub fn is_assigned_to(&self, project_id: &str) -> bool {
        self.assignments.contains_project(project_id)
    }
}

/// Wire form of an employee carrying both assignment shapes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub assignments: AssignmentInput,
    #[serde(default)]
    pub annual_working_hours: Option<f64>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl From<Employee> for EmployeeRecord {
    fn from(employee: Employee) -> Self {
        let legacy = employee.assignments.legacy_view();
        Self {
            id: employee.id,
            name: employee.name,
            email: employee.email,
            assignments: AssignmentInput {
                assigned_projects: Some(employee.assignments.project_ids()),
                assigned_countries_by_project: Some(employee.assignments.countries_by_project()),
                default_project_id: Some(legacy.default_project_id),
                assigned_countries: Some(legacy.assigned_countries),
            },
            annual_working_hours: employee.annual_working_hours,
            created_at: employee.created_at,
        }
    }
}

impl From<EmployeeRecord> for Employee {
    fn from(record: EmployeeRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email.filter(|e| !e.is_empty()),
            assignments: record.assignments.resolve(None).unwrap_or_default(),
            annual_working_hours: record.annual_working_hours,
            created_at: record.created_at,
        }
    }
}

/// Input for employee creation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub email: Option<String>,
    #[serde(flatten)]
    pub assignments: AssignmentInput,
    pub annual_working_hours: Option<serde_json::Value>,
    /// Kept when re-importing an exported employee
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Partial employee update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(flatten)]
    pub assignments: AssignmentInput,
    /// Absent keeps the stored value; `null` clears it
    #[serde(
        default,
        deserialize_with = "null_as_clear",
        skip_serializing_if = "Option::is_none"
    )]
    pub annual_working_hours: Option<Option<serde_json::Value>>,
}

impl From<Employee> for NewEmployee {
    fn from(employee: Employee) -> Self {
        Self {
            id: Some(employee.id),
            name: employee.name,
            email: employee.email,
            assignments: AssignmentInput {
                assigned_projects: Some(employee.assignments.project_ids()),
                assigned_countries_by_project: Some(employee.assignments.countries_by_project()),
                default_project_id: None,
                assigned_countries: None,
            },
            annual_working_hours: employee.annual_working_hours.map(serde_json::Value::from),
            created_at: Some(employee.created_at),
        }
    }
}
