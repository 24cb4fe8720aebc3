//! Export and import bundles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::null_as_default;
use super::{CapacityEntry, CapacityInput, Employee, NewEmployee, NewProject, Project};

/// Everything the tracker stores, as written by an export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub projects: Vec<Project>,
    pub employees: Vec<Employee>,
    pub capacity: Vec<CapacityEntry>,
    pub exported_at: DateTime<Utc>,
}

/// Import input. Accepts an [`ExportBundle`] document; every section is
/// optional and `exportedAt` is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBundle {
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<NewProject>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub employees: Vec<NewEmployee>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capacity: Vec<CapacityInput>,
}

impl From<ExportBundle> for ImportBundle {
    fn from(bundle: ExportBundle) -> Self {
        Self {
            projects: bundle.projects.into_iter().map(NewProject::from).collect(),
            employees: bundle.employees.into_iter().map(NewEmployee::from).collect(),
            capacity: bundle.capacity.into_iter().map(CapacityInput::from).collect(),
        }
    }
}

/// Rows written by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub projects: usize,
    pub employees: usize,
    pub capacity: usize,
}
