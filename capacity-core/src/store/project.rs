//! Project Store - projects, task groups and metrics

use async_trait::async_trait;

use super::Store;
use crate::error::StoreResult;
use crate::types::{
    Metric, MetricUpdate, NewMetric, NewProject, NewTaskGroup, Project, ProjectUpdate, TaskGroup,
    TaskGroupUpdate,
};

/// Project Store trait
#[async_trait]
pub trait ProjectStore: Store {
    /// Create a project, with any nested task groups and metrics, atomically
    async fn create_project(&self, project: NewProject) -> StoreResult<Project>;

    /// Get a fully nested project
    async fn get_project(&self, id: &str) -> StoreResult<Option<Project>>;

    /// List all projects, fully nested, in creation order
    async fn list_projects(&self) -> StoreResult<Vec<Project>>;

    /// Update a project; fails with NotFound when absent
    async fn update_project(&self, id: &str, update: ProjectUpdate) -> StoreResult<Project>;

    /// Delete a project and everything that references it
    async fn delete_project(&self, id: &str) -> StoreResult<()>;

    /// Create a task group (and nested metrics) under a project
    async fn create_task_group(
        &self,
        project_id: &str,
        task_group: NewTaskGroup,
    ) -> StoreResult<TaskGroup>;

    async fn update_task_group(&self, id: &str, update: TaskGroupUpdate) -> StoreResult<TaskGroup>;

    async fn delete_task_group(&self, id: &str) -> StoreResult<()>;

    /// Create a metric under a task group
    async fn create_metric(&self, task_group_id: &str, metric: NewMetric) -> StoreResult<Metric>;

    async fn update_metric(&self, id: &str, update: MetricUpdate) -> StoreResult<Metric>;

    async fn delete_metric(&self, id: &str) -> StoreResult<()>;
}
