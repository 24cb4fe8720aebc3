//! Capacity rows

use capacity_core::CapacityEntry;
use rusqlite::Row;

use super::timestamp_or_epoch;

/// Row of `capacity`
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityRow {
    pub id: i64,
    pub employee_id: String,
    pub project_id: String,
    pub country: String,
    pub task_group_id: String,
    pub metric_id: String,
    pub time_per_unit: f64,
    pub count: f64,
    pub total: f64,
    pub updated_at: Option<String>,
}

impl CapacityRow {
    pub const COLUMNS: &'static str = "id, employee_id, project_id, country, task_group_id, \
         metric_id, time_per_unit, count, total, updated_at";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            employee_id: row.get(1)?,
            project_id: row.get(2)?,
            country: row.get(3)?,
            task_group_id: row.get(4)?,
            metric_id: row.get(5)?,
            time_per_unit: row.get::<_, Option<f64>>(6)?.unwrap_or(0.0),
            count: row.get::<_, Option<f64>>(7)?.unwrap_or(0.0),
            total: row.get::<_, Option<f64>>(8)?.unwrap_or(0.0),
            updated_at: row.get(9)?,
        })
    }

    pub fn into_domain(self) -> CapacityEntry {
        CapacityEntry {
            id: self.id,
            employee_id: self.employee_id,
            project_id: self.project_id,
            country: self.country,
            task_group_id: self.task_group_id,
            metric_id: self.metric_id,
            time_per_unit: self.time_per_unit,
            count: self.count,
            total: self.total,
            updated_at: timestamp_or_epoch(self.updated_at.as_deref()),
        }
    }
}
