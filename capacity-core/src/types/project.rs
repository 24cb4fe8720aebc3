//! Project, task group and metric types
//!
//! A project owns an ordered country list, free-text platform notes per
//! country, and task groups; each task group owns metrics. These types are
//! also the wire representation (camelCase JSON).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::common::null_as_default;
use crate::constants::DEFAULT_METRIC_UNIT;

/// Country name -> platform description
pub type CountryPlatforms = BTreeMap<String, String>;

/// Project with nested task groups and metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub country_platforms: CountryPlatforms,
    #[serde(default)]
    pub task_groups: Vec<TaskGroup>,
}

impl Project {
    /// Whether the country is part of this project
    pub fn has_country(&self, country: &str) -> bool {
        self.countries.iter().any(|c| c == country)
    }

    /// Find a task group by id
    pub fn task_group(&self, task_group_id: &str) -> Option<&TaskGroup> {
        self.task_groups.iter().find(|tg| tg.id == task_group_id)
    }

    /// Number of metrics across all task groups
    pub fn metric_count(&self) -> usize {
        self.task_groups.iter().map(|tg| tg.metrics.len()).sum()
    }
}

/// Named category of work within a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGroup {
    pub id: String,
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub metrics: Vec<Metric>,
}

/// Unit of measurable work within a task group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: String,
    pub task_group_id: String,
    pub name: String,
    #[serde(default = "default_unit")]
    pub unit: String,
}

fn default_unit() -> String {
    DEFAULT_METRIC_UNIT.to_string()
}

/// Resolve an optional unit, falling back to the default for absent or blank values
pub fn unit_or_default(unit: Option<String>) -> String {
    match unit {
        Some(u) if !u.trim().is_empty() => u,
        _ => default_unit(),
    }
}

// ============ Write inputs ============

/// Input for project creation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub countries: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country_platforms: CountryPlatforms,
    #[serde(default, deserialize_with = "null_as_default")]
    pub task_groups: Vec<NewTaskGroup>,
}

/// Input for task group creation (standalone or nested in a new project)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaskGroup {
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: Vec<NewMetric>,
}

/// Input for metric creation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMetric {
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub unit: Option<String>,
}

/// Partial project update; `None` keeps the stored value, `Some` replaces it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub countries: Option<Vec<String>>,
    pub country_platforms: Option<CountryPlatforms>,
}

/// Partial task group update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskGroupUpdate {
    pub name: Option<String>,
}

/// Partial metric update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricUpdate {
    pub name: Option<String>,
    pub unit: Option<String>,
}

impl From<Project> for NewProject {
    fn from(project: Project) -> Self {
        Self {
            id: Some(project.id),
            name: project.name,
            countries: project.countries,
            country_platforms: project.country_platforms,
            task_groups: project
                .task_groups
                .into_iter()
                .map(|tg| NewTaskGroup {
                    id: Some(tg.id),
                    name: tg.name,
                    metrics: tg
                        .metrics
                        .into_iter()
                        .map(|m| NewMetric {
                            id: Some(m.id),
                            name: m.name,
                            unit: Some(m.unit),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Keep the first occurrence of every country, preserving order
pub fn dedup_countries(countries: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    countries
        .into_iter()
        .filter(|c| seen.insert(c.clone()))
        .collect()
}
