//! Project, task group and metric repositories

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

use capacity_core::{Metric, Project, TaskGroup};

use crate::entities::{MetricRow, ProjectRow, TaskGroupRow};
use crate::error::DbResult;

/// How a write treats an existing row with the same id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Fail on an existing id
    Insert,
    /// Overwrite an existing id
    Upsert,
}

/// Project repository
pub struct ProjectRepo<'c> {
    conn: &'c Connection,
}

impl<'c> ProjectRepo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn write(&self, row: &ProjectRow, mode: WriteMode) -> DbResult<()> {
        let sql = match mode {
            WriteMode::Insert => {
                "INSERT INTO projects (id, name, countries, country_platforms)
                 VALUES (?1, ?2, ?3, ?4)"
            }
            WriteMode::Upsert => {
                "INSERT INTO projects (id, name, countries, country_platforms)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    countries = excluded.countries,
                    country_platforms = excluded.country_platforms"
            }
        };
        self.conn.execute(
            sql,
            params![row.id, row.name, row.countries_json, row.platforms_json],
        )?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> DbResult<Option<ProjectRow>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM projects WHERE id = ?1", ProjectRow::COLUMNS),
                params![id],
                ProjectRow::from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn exists(&self, id: &str) -> DbResult<bool> {
        Ok(self.get(id)?.is_some())
    }

    pub fn list(&self) -> DbResult<Vec<ProjectRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM projects ORDER BY rowid",
            ProjectRow::COLUMNS
        ))?;
        let rows = stmt
            .query_map([], ProjectRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count(&self) -> DbResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?)
    }

    pub fn update(&self, row: &ProjectRow) -> DbResult<usize> {
        Ok(self.conn.execute(
            "UPDATE projects SET name = ?2, countries = ?3, country_platforms = ?4 WHERE id = ?1",
            params![row.id, row.name, row.countries_json, row.platforms_json],
        )?)
    }

    /// Returns the number of project rows removed; dependents cascade
    pub fn delete(&self, id: &str) -> DbResult<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id])?)
    }

    /// Load one project with its task groups and metrics
    pub fn load(&self, id: &str) -> DbResult<Option<Project>> {
        let Some(row) = self.get(id)? else {
            return Ok(None);
        };
        let task_groups = TaskGroupRepo::new(self.conn).load_for_project(&row.id)?;
        Ok(Some(row.into_domain(task_groups)))
    }

    /// Load every project, fully nested, in creation order
    pub fn load_all(&self) -> DbResult<Vec<Project>> {
        let projects = self.list()?;
        let mut metrics_by_group: HashMap<String, Vec<Metric>> = HashMap::new();
        for metric in MetricRepo::new(self.conn).list_all()? {
            metrics_by_group
                .entry(metric.task_group_id.clone())
                .or_default()
                .push(metric.into_domain());
        }
        let mut groups_by_project: HashMap<String, Vec<TaskGroup>> = HashMap::new();
        for group in TaskGroupRepo::new(self.conn).list_all()? {
            let metrics = metrics_by_group.remove(&group.id).unwrap_or_default();
            groups_by_project
                .entry(group.project_id.clone())
                .or_default()
                .push(group.into_domain(metrics));
        }
        Ok(projects
            .into_iter()
            .map(|row| {
                let groups = groups_by_project.remove(&row.id).unwrap_or_default();
                row.into_domain(groups)
            })
            .collect())
    }
}

/// Task group repository
pub struct TaskGroupRepo<'c> {
    conn: &'c Connection,
}

impl<'c> TaskGroupRepo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn write(&self, row: &TaskGroupRow, mode: WriteMode) -> DbResult<()> {
        let sql = match mode {
            WriteMode::Insert => {
                "INSERT INTO task_groups (id, project_id, name) VALUES (?1, ?2, ?3)"
            }
            WriteMode::Upsert => {
                "INSERT INTO task_groups (id, project_id, name) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                    project_id = excluded.project_id,
                    name = excluded.name"
            }
        };
        self.conn
            .execute(sql, params![row.id, row.project_id, row.name])?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> DbResult<Option<TaskGroupRow>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM task_groups WHERE id = ?1",
                    TaskGroupRow::COLUMNS
                ),
                params![id],
                TaskGroupRow::from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn exists(&self, id: &str) -> DbResult<bool> {
        Ok(self.get(id)?.is_some())
    }

    pub fn list_for_project(&self, project_id: &str) -> DbResult<Vec<TaskGroupRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM task_groups WHERE project_id = ?1 ORDER BY rowid",
            TaskGroupRow::COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![project_id], TaskGroupRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn list_all(&self) -> DbResult<Vec<TaskGroupRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM task_groups ORDER BY rowid",
            TaskGroupRow::COLUMNS
        ))?;
        let rows = stmt
            .query_map([], TaskGroupRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn rename(&self, id: &str, name: &str) -> DbResult<usize> {
        Ok(self.conn.execute(
            "UPDATE task_groups SET name = ?2 WHERE id = ?1",
            params![id, name],
        )?)
    }

    pub fn delete(&self, id: &str) -> DbResult<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM task_groups WHERE id = ?1", params![id])?)
    }

    /// Load one task group with its metrics
    pub fn load(&self, id: &str) -> DbResult<Option<TaskGroup>> {
        let Some(row) = self.get(id)? else {
            return Ok(None);
        };
        let metrics = MetricRepo::new(self.conn).load_for_task_group(&row.id)?;
        Ok(Some(row.into_domain(metrics)))
    }

    pub fn load_for_project(&self, project_id: &str) -> DbResult<Vec<TaskGroup>> {
        let metrics = MetricRepo::new(self.conn);
        self.list_for_project(project_id)?
            .into_iter()
            .map(|row| -> DbResult<TaskGroup> {
                let group_metrics = metrics.load_for_task_group(&row.id)?;
                Ok(row.into_domain(group_metrics))
            })
            .collect()
    }
}

/// Metric repository
pub struct MetricRepo<'c> {
    conn: &'c Connection,
}

impl<'c> MetricRepo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn write(&self, row: &MetricRow, mode: WriteMode) -> DbResult<()> {
        let sql = match mode {
            WriteMode::Insert => {
                "INSERT INTO metrics (id, task_group_id, name, unit) VALUES (?1, ?2, ?3, ?4)"
            }
            WriteMode::Upsert => {
                "INSERT INTO metrics (id, task_group_id, name, unit) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    task_group_id = excluded.task_group_id,
                    name = excluded.name,
                    unit = excluded.unit"
            }
        };
        self.conn.execute(
            sql,
            params![row.id, row.task_group_id, row.name, row.unit],
        )?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> DbResult<Option<MetricRow>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM metrics WHERE id = ?1", MetricRow::COLUMNS),
                params![id],
                MetricRow::from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn list_all(&self) -> DbResult<Vec<MetricRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM metrics ORDER BY rowid",
            MetricRow::COLUMNS
        ))?;
        let rows = stmt
            .query_map([], MetricRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn update(&self, row: &MetricRow) -> DbResult<usize> {
        Ok(self.conn.execute(
            "UPDATE metrics SET name = ?2, unit = ?3 WHERE id = ?1",
            params![row.id, row.name, row.unit],
        )?)
    }

    pub fn delete(&self, id: &str) -> DbResult<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM metrics WHERE id = ?1", params![id])?)
    }

    pub fn load_for_task_group(&self, task_group_id: &str) -> DbResult<Vec<Metric>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM metrics WHERE task_group_id = ?1 ORDER BY rowid",
            MetricRow::COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![task_group_id], MetricRow::from_row)?
            .map(|row| row.map(MetricRow::into_domain))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
