//! Capacity grid types
//!
//! One [`CapacityEntry`] per (employee, project, country, task group, metric)
//! cell. `total` is always `time_per_unit * count` as of the last write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{coerce_number, null_as_default};

/// The five-column key of a capacity cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityKey {
    pub employee_id: String,
    pub project_id: String,
    pub country: String,
    pub task_group_id: String,
    pub metric_id: String,
}

/// A stored capacity cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityEntry {
    pub id: i64,
    pub employee_id: String,
    pub project_id: String,
    pub country: String,
    pub task_group_id: String,
    pub metric_id: String,
    pub time_per_unit: f64,
    pub count: f64,
    pub total: f64,
    pub updated_at: DateTime<Utc>,
}

impl CapacityEntry {
    pub fn key(&self) -> CapacityKey {
        CapacityKey {
            employee_id: self.employee_id.clone(),
            project_id: self.project_id.clone(),
            country: self.country.clone(),
            task_group_id: self.task_group_id.clone(),
            metric_id: self.metric_id.clone(),
        }
    }

    pub fn matches(&self, scope: &CapacityScope) -> bool {
        self.employee_id == scope.employee_id
            && self.project_id == scope.project_id
            && scope.country.as_ref().map_or(true, |c| &self.country == c)
            && scope
                .task_group_id
                .as_ref()
                .map_or(true, |t| &self.task_group_id == t)
    }
}

/// Values for a capacity write. Only the upsert path builds these, so the
/// stored total can never disagree with its factors.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityWrite {
    pub key: CapacityKey,
    pub time_per_unit: f64,
    pub count: f64,
}

impl CapacityWrite {
    pub fn new(key: CapacityKey, time_per_unit: f64, count: f64) -> Self {
        Self {
            key,
            time_per_unit,
            count,
        }
    }

    /// Build from raw client values, coercing non-numeric input to zero
    pub fn from_raw(
        key: CapacityKey,
        time_per_unit: Option<&serde_json::Value>,
        count: Option<&serde_json::Value>,
    ) -> Self {
        Self::new(key, coerce_number(time_per_unit), coerce_number(count))
    }

    /// `time_per_unit * count`; a product that overflows is stored as zero
    pub fn total(&self) -> f64 {
        let total = self.time_per_unit * self.count;
        if total.is_finite() {
            total
        } else {
            0.0
        }
    }
}

/// A capacity write as it arrives from outside: numeric fields are raw
/// JSON and go through [`coerce_number`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub employee_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub task_group_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metric_id: String,
    #[serde(default)]
    pub time_per_unit: Option<serde_json::Value>,
    #[serde(default)]
    pub count: Option<serde_json::Value>,
}

impl CapacityInput {
    pub fn into_write(self) -> CapacityWrite {
        let key = CapacityKey {
            employee_id: self.employee_id,
            project_id: self.project_id,
            country: self.country,
            task_group_id: self.task_group_id,
            metric_id: self.metric_id,
        };
        CapacityWrite::from_raw(key, self.time_per_unit.as_ref(), self.count.as_ref())
    }
}

impl From<CapacityEntry> for CapacityInput {
    fn from(entry: CapacityEntry) -> Self {
        Self {
            employee_id: entry.employee_id,
            project_id: entry.project_id,
            country: entry.country,
            task_group_id: entry.task_group_id,
            metric_id: entry.metric_id,
            time_per_unit: Some(entry.time_per_unit.into()),
            count: Some(entry.count.into()),
        }
    }
}

/// Equality filters for listing capacity; `None` means unfiltered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapacityFilter {
    pub employee_id: Option<String>,
    pub project_id: Option<String>,
}

impl CapacityFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn employee(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: Some(employee_id.into()),
            project_id: None,
        }
    }

    pub fn employee_project(employee_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            employee_id: Some(employee_id.into()),
            project_id: Some(project_id.into()),
        }
    }

    pub fn matches(&self, entry: &CapacityEntry) -> bool {
        self.employee_id
            .as_ref()
            .map_or(true, |e| &entry.employee_id == e)
            && self
                .project_id
                .as_ref()
                .map_or(true, |p| &entry.project_id == p)
    }
}

/// Aggregation scope for capacity totals. Employee and project are always
/// bound; country and task group narrow the sum when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityScope {
    pub employee_id: String,
    pub project_id: String,
    pub country: Option<String>,
    pub task_group_id: Option<String>,
}

impl CapacityScope {
    pub fn project(employee_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            project_id: project_id.into(),
            country: None,
            task_group_id: None,
        }
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn task_group(mut self, task_group_id: impl Into<String>) -> Self {
        self.task_group_id = Some(task_group_id.into());
        self
    }
}

/// Sum of `total` over entries in scope; zero when nothing matches
pub fn sum_totals<'a>(
    entries: impl IntoIterator<Item = &'a CapacityEntry>,
    scope: &CapacityScope,
) -> f64 {
    entries
        .into_iter()
        .filter(|e| e.matches(scope))
        .map(|e| e.total)
        .sum()
}
