//! Project, task group and metric rows

use capacity_core::{CountryPlatforms, Metric, Project, TaskGroup};
use rusqlite::Row;

use super::json_or_default;

/// Row of `projects`; list columns are JSON text
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRow {
    pub id: String,
    pub name: String,
    pub countries_json: String,
    pub platforms_json: String,
}

impl ProjectRow {
    pub const COLUMNS: &'static str = "id, name, countries, country_platforms";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            countries_json: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            platforms_json: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        })
    }

    pub fn new(
        id: String,
        name: String,
        countries: &[String],
        platforms: &CountryPlatforms,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id,
            name,
            countries_json: serde_json::to_string(countries)?,
            platforms_json: serde_json::to_string(platforms)?,
        })
    }

    pub fn countries(&self) -> Vec<String> {
        json_or_default(&self.countries_json)
    }

    pub fn platforms(&self) -> CountryPlatforms {
        json_or_default(&self.platforms_json)
    }

    pub fn into_domain(self, task_groups: Vec<TaskGroup>) -> Project {
        Project {
            countries: self.countries(),
            country_platforms: self.platforms(),
            id: self.id,
            name: self.name,
            task_groups,
        }
    }
}

/// Row of `task_groups`
#[derive(Debug, Clone, PartialEq)]
pub struct TaskGroupRow {
    pub id: String,
    pub project_id: String,
    pub name: String,
}

impl TaskGroupRow {
    pub const COLUMNS: &'static str = "id, project_id, name";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            project_id: row.get(1)?,
            name: row.get(2)?,
        })
    }

    pub fn into_domain(self, metrics: Vec<Metric>) -> TaskGroup {
        TaskGroup {
            id: self.id,
            project_id: self.project_id,
            name: self.name,
            metrics,
        }
    }
}

/// Row of `metrics`
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub id: String,
    pub task_group_id: String,
    pub name: String,
    pub unit: String,
}

impl MetricRow {
    pub const COLUMNS: &'static str = "id, task_group_id, name, unit";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            task_group_id: row.get(1)?,
            name: row.get(2)?,
            unit: capacity_core::unit_or_default(row.get(3)?),
        })
    }

    pub fn into_domain(self) -> Metric {
        Metric {
            id: self.id,
            task_group_id: self.task_group_id,
            name: self.name,
            unit: self.unit,
        }
    }
}
