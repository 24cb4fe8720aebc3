//! Project Store Service Implementation
//!
//! Implements the ProjectStore trait using capacity-db repositories.

use async_trait::async_trait;
use rusqlite::Connection;
use std::sync::Arc;
use tracing::{debug, info};

use capacity_core::ids;
use capacity_core::store::{ProjectStore, Store};
use capacity_core::{
    dedup_countries, unit_or_default, EntityKind, Metric, MetricUpdate, NewMetric, NewProject,
    NewTaskGroup, Project, ProjectUpdate, StoreResult, TaskGroup, TaskGroupUpdate,
};

use crate::entities::{MetricRow, ProjectRow, TaskGroupRow};
use crate::error::{DbError, DbResult};
use crate::repos::{AssignmentRepo, CapacityDatabase, MetricRepo, ProjectRepo, TaskGroupRepo, WriteMode};
use crate::validation::{name_or_keep, prune_platforms, validate_name, validate_platforms};

/// Project Store Service
pub struct ProjectService {
    database: Arc<CapacityDatabase>,
}

impl ProjectService {
    /// Create a new Project Service
    pub fn new(database: Arc<CapacityDatabase>) -> Self {
        Self { database }
    }
}

/// Write a project with its task groups and metrics. Callers own the
/// transaction. Returns the project id.
pub(crate) fn write_project_tree(
    conn: &Connection,
    project: NewProject,
    mode: WriteMode,
) -> DbResult<String> {
    let name = validate_name(EntityKind::Project, project.name)?;
    let countries = dedup_countries(project.countries);
    validate_platforms(&countries, &project.country_platforms)?;

    let id = ids::or_generate(project.id, ids::project_id);
    let row = ProjectRow::new(id.clone(), name, &countries, &project.country_platforms)?;
    ProjectRepo::new(conn).write(&row, mode)?;

    for task_group in project.task_groups {
        write_task_group_tree(conn, &id, task_group, mode)?;
    }
    Ok(id)
}

fn write_task_group_tree(
    conn: &Connection,
    project_id: &str,
    task_group: NewTaskGroup,
    mode: WriteMode,
) -> DbResult<String> {
    let row = TaskGroupRow {
        id: ids::or_generate(task_group.id, ids::task_group_id),
        project_id: project_id.to_string(),
        name: validate_name(EntityKind::TaskGroup, task_group.name)?,
    };
    TaskGroupRepo::new(conn).write(&row, mode)?;

    for metric in task_group.metrics {
        write_metric(conn, &row.id, metric, mode)?;
    }
    Ok(row.id)
}

fn write_metric(
    conn: &Connection,
    task_group_id: &str,
    metric: NewMetric,
    mode: WriteMode,
) -> DbResult<String> {
    let row = MetricRow {
        id: ids::or_generate(metric.id, ids::metric_id),
        task_group_id: task_group_id.to_string(),
        name: validate_name(EntityKind::Metric, metric.name)?,
        unit: unit_or_default(metric.unit),
    };
    MetricRepo::new(conn).write(&row, mode)?;
    Ok(row.id)
}

fn loaded<T>(value: Option<T>, kind: EntityKind, id: &str) -> DbResult<T> {
    value.ok_or_else(|| DbError::not_found(kind, id))
}

#[async_trait]
impl Store for ProjectService {
    fn name(&self) -> &'static str {
        "projects"
    }

    async fn verify_integrity(&self) -> StoreResult<bool> {
        let projects = self
            .database
            .call(|conn| ProjectRepo::new(conn).list())
            .await?;
        for row in &projects {
            let countries = row.countries();
            if validate_platforms(&countries, &row.platforms()).is_err() {
                debug!(project_id = %row.id, "Platform keys outside project countries");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl ProjectStore for ProjectService {
    async fn create_project(&self, project: NewProject) -> StoreResult<Project> {
        let created = self
            .database
            .transaction(|conn| {
                let id = write_project_tree(conn, project, WriteMode::Insert)?;
                loaded(ProjectRepo::new(conn).load(&id)?, EntityKind::Project, &id)
            })
            .await?;

        info!(
            project_id = %created.id,
            task_groups = created.task_groups.len(),
            metrics = created.metric_count(),
            "Project created"
        );
        Ok(created)
    }

    async fn get_project(&self, id: &str) -> StoreResult<Option<Project>> {
        let id = id.to_string();
        debug!(project_id = %id, "Loading project");
        Ok(self
            .database
            .call(move |conn| ProjectRepo::new(conn).load(&id))
            .await?)
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        Ok(self
            .database
            .call(|conn| ProjectRepo::new(conn).load_all())
            .await?)
    }

    async fn update_project(&self, id: &str, update: ProjectUpdate) -> StoreResult<Project> {
        let id = id.to_string();
        let updated = self
            .database
            .transaction(move |conn| {
                let projects = ProjectRepo::new(conn);
                let current = loaded(projects.get(&id)?, EntityKind::Project, &id)?;

                let countries_changed = update.countries.is_some();
                let countries = match update.countries {
                    Some(countries) => dedup_countries(countries),
                    None => current.countries(),
                };
                let platforms = match update.country_platforms {
                    Some(platforms) => platforms,
                    None => prune_platforms(current.platforms(), &countries),
                };
                validate_platforms(&countries, &platforms)?;

                let name = name_or_keep(update.name, current.name);
                projects.update(&ProjectRow::new(id.clone(), name, &countries, &platforms)?)?;

                if countries_changed {
                    let narrowed = AssignmentRepo::new(conn).narrow_to(&id, &countries)?;
                    if narrowed > 0 {
                        debug!(project_id = %id, count = narrowed, "Narrowed employee assignments");
                    }
                }

                loaded(projects.load(&id)?, EntityKind::Project, &id)
            })
            .await?;

        info!(project_id = %updated.id, "Project updated");
        Ok(updated)
    }

    async fn delete_project(&self, id: &str) -> StoreResult<()> {
        let id = id.to_string();
        let removed = {
            let id = id.clone();
            self.database
                .call(move |conn| ProjectRepo::new(conn).delete(&id))
                .await?
        };
        if removed == 0 {
            return Err(DbError::not_found(EntityKind::Project, id).into());
        }
        info!(project_id = %id, "Project deleted");
        Ok(())
    }

    async fn create_task_group(
        &self,
        project_id: &str,
        task_group: NewTaskGroup,
    ) -> StoreResult<TaskGroup> {
        let project_id = project_id.to_string();
        let created = self
            .database
            .transaction(move |conn| {
                if !ProjectRepo::new(conn).exists(&project_id)? {
                    return Err(DbError::not_found(EntityKind::Project, project_id));
                }
                let id = write_task_group_tree(conn, &project_id, task_group, WriteMode::Insert)?;
                loaded(TaskGroupRepo::new(conn).load(&id)?, EntityKind::TaskGroup, &id)
            })
            .await?;

        info!(
            task_group_id = %created.id,
            project_id = %created.project_id,
            "Task group created"
        );
        Ok(created)
    }

    async fn update_task_group(&self, id: &str, update: TaskGroupUpdate) -> StoreResult<TaskGroup> {
        let id = id.to_string();
        let updated = self
            .database
            .transaction(move |conn| {
                let groups = TaskGroupRepo::new(conn);
                let current = loaded(groups.get(&id)?, EntityKind::TaskGroup, &id)?;
                groups.rename(&id, &name_or_keep(update.name, current.name))?;
                loaded(groups.load(&id)?, EntityKind::TaskGroup, &id)
            })
            .await?;

        info!(task_group_id = %updated.id, "Task group updated");
        Ok(updated)
    }

    async fn delete_task_group(&self, id: &str) -> StoreResult<()> {
        let id = id.to_string();
        let removed = {
            let id = id.clone();
            self.database
                .call(move |conn| TaskGroupRepo::new(conn).delete(&id))
                .await?
        };
        if removed == 0 {
            return Err(DbError::not_found(EntityKind::TaskGroup, id).into());
        }
        info!(task_group_id = %id, "Task group deleted");
        Ok(())
    }

    async fn create_metric(&self, task_group_id: &str, metric: NewMetric) -> StoreResult<Metric> {
        let task_group_id = task_group_id.to_string();
        let created = self
            .database
            .transaction(move |conn| {
                if !TaskGroupRepo::new(conn).exists(&task_group_id)? {
                    return Err(DbError::not_found(EntityKind::TaskGroup, task_group_id));
                }
                let id = write_metric(conn, &task_group_id, metric, WriteMode::Insert)?;
                let row = loaded(MetricRepo::new(conn).get(&id)?, EntityKind::Metric, &id)?;
                Ok(row.into_domain())
            })
            .await?;

        info!(
            metric_id = %created.id,
            task_group_id = %created.task_group_id,
            "Metric created"
        );
        Ok(created)
    }

    async fn update_metric(&self, id: &str, update: MetricUpdate) -> StoreResult<Metric> {
        let id = id.to_string();
        let updated = self
            .database
            .transaction(move |conn| {
                let metrics = MetricRepo::new(conn);
                let current = loaded(metrics.get(&id)?, EntityKind::Metric, &id)?;
                let unit = match update.unit {
                    Some(unit) if !unit.trim().is_empty() => unit,
                    _ => current.unit.clone(),
                };
                let row = MetricRow {
                    name: name_or_keep(update.name, current.name.clone()),
                    unit,
                    ..current
                };
                metrics.update(&row)?;
                Ok(row.into_domain())
            })
            .await?;

        info!(metric_id = %updated.id, "Metric updated");
        Ok(updated)
    }

    async fn delete_metric(&self, id: &str) -> StoreResult<()> {
        let id = id.to_string();
        let removed = {
            let id = id.clone();
            self.database
                .call(move |conn| MetricRepo::new(conn).delete(&id))
                .await?
        };
        if removed == 0 {
            return Err(DbError::not_found(EntityKind::Metric, id).into());
        }
        info!(metric_id = %id, "Metric deleted");
        Ok(())
    }
}
