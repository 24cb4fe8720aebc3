//! HTTP client for the capacity API
//!
//! Holds one cached list per resource kind. Reads fill the cache on first
//! use; every mutating call invalidates the kinds it can affect, so the next
//! read re-fetches. Totals fall back to summing the cached capacity list
//! when the totals endpoint cannot be reached.

use capacity_api::{HealthResponse, TotalResponse};
use capacity_core::{
    sum_totals, CapacityEntry, CapacityInput, CapacityKey, CapacityScope, Employee,
    EmployeeUpdate, ExportBundle, ImportBundle, ImportSummary, Metric, MetricUpdate, NewEmployee,
    NewMetric, NewProject, NewTaskGroup, Project, ProjectUpdate, TaskGroup, TaskGroupUpdate,
};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Request timeout for [`CapacityClient::new`]
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client errors
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// Non-success response; `message` is the server's `error` field
    #[error("{status}: {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Cached resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Projects,
    Employees,
    Capacity,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [Self::Projects, Self::Employees, Self::Capacity];

    /// Path segments of the list endpoint
    pub fn segments(&self) -> &'static [&'static str] {
        match self {
            Self::Projects => &["api", "projects"],
            Self::Employees => &["api", "employees"],
            Self::Capacity => &["api", "capacity"],
        }
    }
}

/// A full list of one kind
#[derive(Debug, Clone)]
pub enum Listing {
    Projects(Arc<Vec<Project>>),
    Employees(Arc<Vec<Employee>>),
    Capacity(Arc<Vec<CapacityEntry>>),
}

impl Listing {
    pub fn len(&self) -> usize {
        match self {
            Self::Projects(list) => list.len(),
            Self::Employees(list) => list.len(),
            Self::Capacity(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// One cached list
struct CachedList<T> {
    slot: RwLock<Option<Arc<Vec<T>>>>,
}

impl<T> CachedList<T> {
    fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    async fn get_or_load<F, Fut>(&self, load: F) -> ClientResult<Arc<Vec<T>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<Vec<T>>>,
    {
        if let Some(list) = self.slot.read().await.as_ref() {
            return Ok(list.clone());
        }
        let mut slot = self.slot.write().await;
        if let Some(list) = slot.as_ref() {
            return Ok(list.clone());
        }
        let list = Arc::new(load().await?);
        *slot = Some(list.clone());
        Ok(list)
    }

    async fn clear(&self) {
        *self.slot.write().await = None;
    }

    async fn is_cached(&self) -> bool {
        self.slot.read().await.is_some()
    }
}

/// Client for a running capacity API server
pub struct CapacityClient {
    http: reqwest::Client,
    base_url: String,
    projects: CachedList<Project>,
    employees: CachedList<Employee>,
    capacity: CachedList<CapacityEntry>,
}

impl CapacityClient {
    /// Create a client for `base_url` (e.g. `http://localhost:3001`)
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    /// Create with custom timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout_secs: u64) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self::with_http(http, base_url))
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            projects: CachedList::new(),
            employees: CachedList::new(),
            capacity: CachedList::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ============ Cache ============

    /// Full list of one kind, from cache when present
    pub async fn fetch_all(&self, kind: ResourceKind) -> ClientResult<Listing> {
        Ok(match kind {
            ResourceKind::Projects => Listing::Projects(self.projects().await?),
            ResourceKind::Employees => Listing::Employees(self.employees().await?),
            ResourceKind::Capacity => Listing::Capacity(self.capacity().await?),
        })
    }

    pub async fn projects(&self) -> ClientResult<Arc<Vec<Project>>> {
        self.projects
            .get_or_load(|| self.get_json(ResourceKind::Projects.segments()))
            .await
    }

    pub async fn employees(&self) -> ClientResult<Arc<Vec<Employee>>> {
        self.employees
            .get_or_load(|| self.get_json(ResourceKind::Employees.segments()))
            .await
    }

    pub async fn capacity(&self) -> ClientResult<Arc<Vec<CapacityEntry>>> {
        self.capacity
            .get_or_load(|| self.get_json(ResourceKind::Capacity.segments()))
            .await
    }

    /// Drop the cached list of one kind
    pub async fn invalidate(&self, kind: ResourceKind) {
        debug!(?kind, "Invalidating client cache");
        match kind {
            ResourceKind::Projects => self.projects.clear().await,
            ResourceKind::Employees => self.employees.clear().await,
            ResourceKind::Capacity => self.capacity.clear().await,
        }
    }

    pub async fn invalidate_all(&self) {
        for kind in ResourceKind::ALL {
            self.invalidate(kind).await;
        }
    }

    pub async fn is_cached(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::Projects => self.projects.is_cached().await,
            ResourceKind::Employees => self.employees.is_cached().await,
            ResourceKind::Capacity => self.capacity.is_cached().await,
        }
    }

    async fn invalidate_many(&self, kinds: &[ResourceKind]) {
        for kind in kinds {
            self.invalidate(*kind).await;
        }
    }

    // ============ Projects ============

    pub async fn get_project(&self, id: &str) -> ClientResult<Project> {
        self.get_json(&["api", "projects", id]).await
    }

    pub async fn create_project(&self, project: &NewProject) -> ClientResult<Project> {
        let created = self.send_json(Method::POST, &["api", "projects"], project).await?;
        self.invalidate(ResourceKind::Projects).await;
        Ok(created)
    }

    pub async fn update_project(&self, id: &str, update: &ProjectUpdate) -> ClientResult<Project> {
        let updated = self
            .send_json(Method::PUT, &["api", "projects", id], update)
            .await?;
        // Country changes narrow employee assignments
        self.invalidate_many(&[ResourceKind::Projects, ResourceKind::Employees])
            .await;
        Ok(updated)
    }

    pub async fn delete_project(&self, id: &str) -> ClientResult<()> {
        self.delete(&["api", "projects", id]).await?;
        self.invalidate_all().await;
        Ok(())
    }

    pub async fn create_task_group(
        &self,
        project_id: &str,
        task_group: &NewTaskGroup,
    ) -> ClientResult<TaskGroup> {
        let created = self
            .send_json(
                Method::POST,
                &["api", "projects", project_id, "task-groups"],
                task_group,
            )
            .await?;
        self.invalidate(ResourceKind::Projects).await;
        Ok(created)
    }

    pub async fn update_task_group(
        &self,
        id: &str,
        update: &TaskGroupUpdate,
    ) -> ClientResult<TaskGroup> {
        let updated = self
            .send_json(Method::PUT, &["api", "projects", "task-groups", id], update)
            .await?;
        self.invalidate(ResourceKind::Projects).await;
        Ok(updated)
    }

    pub async fn delete_task_group(&self, id: &str) -> ClientResult<()> {
        self.delete(&["api", "projects", "task-groups", id]).await?;
        self.invalidate_many(&[ResourceKind::Projects, ResourceKind::Capacity])
            .await;
        Ok(())
    }

    pub async fn create_metric(&self, task_group_id: &str, metric: &NewMetric) -> ClientResult<Metric> {
        let created = self
            .send_json(
                Method::POST,
                &["api", "projects", "task-groups", task_group_id, "metrics"],
                metric,
            )
            .await?;
        self.invalidate(ResourceKind::Projects).await;
        Ok(created)
    }

    pub async fn update_metric(&self, id: &str, update: &MetricUpdate) -> ClientResult<Metric> {
        let updated = self
            .send_json(Method::PUT, &["api", "projects", "metrics", id], update)
            .await?;
        self.invalidate(ResourceKind::Projects).await;
        Ok(updated)
    }

    pub async fn delete_metric(&self, id: &str) -> ClientResult<()> {
        self.delete(&["api", "projects", "metrics", id]).await?;
        self.invalidate_many(&[ResourceKind::Projects, ResourceKind::Capacity])
            .await;
        Ok(())
    }

    // ============ Employees ============

    pub async fn get_employee(&self, id: &str) -> ClientResult<Employee> {
        self.get_json(&["api", "employees", id]).await
    }

    /// Employees assigned to one project; not cached
    pub async fn employees_for_project(&self, project_id: &str) -> ClientResult<Vec<Employee>> {
        self.execute(
            self.request(Method::GET, ResourceKind::Employees.segments())?
                .query(&[("projectId", project_id)]),
        )
        .await
    }

    pub async fn create_employee(&self, employee: &NewEmployee) -> ClientResult<Employee> {
        let created = self.send_json(Method::POST, &["api", "employees"], employee).await?;
        self.invalidate(ResourceKind::Employees).await;
        Ok(created)
    }

    pub async fn update_employee(&self, id: &str, update: &EmployeeUpdate) -> ClientResult<Employee> {
        let updated = self
            .send_json(Method::PUT, &["api", "employees", id], update)
            .await?;
        self.invalidate(ResourceKind::Employees).await;
        Ok(updated)
    }

    pub async fn delete_employee(&self, id: &str) -> ClientResult<()> {
        self.delete(&["api", "employees", id]).await?;
        self.invalidate_many(&[ResourceKind::Employees, ResourceKind::Capacity])
            .await;
        Ok(())
    }

    // ============ Capacity ============

    /// One cell, `None` when absent; not cached
    pub async fn capacity_entry(&self, key: &CapacityKey) -> ClientResult<Option<CapacityEntry>> {
        self.execute(
            self.request(Method::GET, &["api", "capacity", "entry"])?
                .query(key),
        )
        .await
    }

    pub async fn upsert_capacity(&self, input: &CapacityInput) -> ClientResult<CapacityEntry> {
        let entry = self.send_json(Method::POST, &["api", "capacity"], input).await?;
        self.invalidate(ResourceKind::Capacity).await;
        Ok(entry)
    }

    pub async fn delete_capacity_by_employee(&self, employee_id: &str) -> ClientResult<()> {
        self.delete(&["api", "capacity", "employee", employee_id])
            .await?;
        self.invalidate(ResourceKind::Capacity).await;
        Ok(())
    }

    pub async fn delete_capacity_by_project(&self, project_id: &str) -> ClientResult<()> {
        self.delete(&["api", "capacity", "project", project_id])
            .await?;
        self.invalidate(ResourceKind::Capacity).await;
        Ok(())
    }

    /// Total for a scope. Country and task group select the endpoint; a
    /// failed call is answered from the cached capacity list.
    pub async fn total(&self, scope: &CapacityScope) -> ClientResult<f64> {
        let endpoint = match (&scope.country, &scope.task_group_id) {
            (Some(_), Some(_)) => "task-group",
            (Some(_), None) => "country",
            _ => "project",
        };
        let mut query = vec![
            ("employeeId", scope.employee_id.as_str()),
            ("projectId", scope.project_id.as_str()),
        ];
        if let Some(country) = &scope.country {
            query.push(("country", country.as_str()));
        }
        if let (Some(_), Some(task_group_id)) = (&scope.country, &scope.task_group_id) {
            query.push(("taskGroupId", task_group_id.as_str()));
        }

        let request = self.request(Method::GET, &["api", "capacity", "totals", endpoint])?;
        let remote: ClientResult<TotalResponse> = self.execute(request.query(&query)).await;
        match remote {
            Ok(response) => Ok(response.total),
            Err(e) => {
                warn!(error = %e, "Totals endpoint failed, summing cached capacity");
                let entries = self.capacity().await?;
                Ok(sum_totals(entries.iter(), scope))
            }
        }
    }

    pub async fn project_total(&self, employee_id: &str, project_id: &str) -> ClientResult<f64> {
        self.total(&CapacityScope::project(employee_id, project_id))
            .await
    }

    pub async fn country_total(
        &self,
        employee_id: &str,
        project_id: &str,
        country: &str,
    ) -> ClientResult<f64> {
        self.total(&CapacityScope::project(employee_id, project_id).country(country))
            .await
    }

    pub async fn task_group_total(
        &self,
        employee_id: &str,
        project_id: &str,
        country: &str,
        task_group_id: &str,
    ) -> ClientResult<f64> {
        let scope = CapacityScope::project(employee_id, project_id)
            .country(country)
            .task_group(task_group_id);
        self.total(&scope).await
    }

    // ============ Transfer and health ============

    pub async fn export(&self) -> ClientResult<ExportBundle> {
        self.get_json(&["api", "export"]).await
    }

    pub async fn import(&self, bundle: &ImportBundle) -> ClientResult<ImportSummary> {
        let summary = self.send_json(Method::POST, &["api", "import"], bundle).await?;
        self.invalidate_all().await;
        Ok(summary)
    }

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        self.get_json(&["health"]).await
    }

    pub async fn ready(&self) -> ClientResult<HealthResponse> {
        self.get_json(&["ready"]).await
    }

    // ============ Transport ============

    /// Base URL extended by `segments`, each percent-encoded
    fn url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> ClientResult<RequestBuilder> {
        Ok(self.http.request(method, self.url(segments)?))
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        self.execute(self.request(Method::GET, segments)?).await
    }

    async fn send_json<B, T>(&self, method: Method, segments: &[&str], body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(method, segments)?.json(body)).await
    }

    async fn delete(&self, segments: &[&str]) -> ClientResult<()> {
        let response = self.request(Method::DELETE, segments)?.send().await?;
        check_status(response).await.map(|_| ())
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }
}

async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_trimmed() {
        let client = CapacityClient::new("http://localhost:3001/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3001");
    }

    #[test]
    fn test_ids_are_encoded_as_one_segment() {
        let client = CapacityClient::new("http://localhost:3001/").unwrap();
        let url = client.url(&["api", "projects", "team/emea"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/api/projects/team%2Femea");

        let url = client.url(&["api", "projects", "q1?draft#x"]).unwrap();
        assert_eq!(url.path(), "/api/projects/q1%3Fdraft%23x");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn test_base_url_with_prefix_keeps_it() {
        let client = CapacityClient::new("http://localhost:3001/tracker").unwrap();
        let url = client.url(&["health"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/tracker/health");
    }

    #[test]
    fn test_unusable_base_url_is_an_error() {
        let client = CapacityClient::new("not a url").unwrap();
        assert!(matches!(
            client.url(&["health"]),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_not_found_detection() {
        let err = ClientError::Api {
            status: 404,
            message: "Project not found".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "404: Project not found");
    }

    #[tokio::test]
    async fn test_cached_list_loads_once() {
        let cache: CachedList<u32> = CachedList::new();
        assert!(!cache.is_cached().await);

        let first = cache.get_or_load(|| async { Ok(vec![1, 2]) }).await.unwrap();
        let second = cache
            .get_or_load(|| async { Ok(vec![9]) })
            .await
            .unwrap();
        assert_eq!(*first, vec![1, 2]);
        assert_eq!(*second, vec![1, 2]);

        cache.clear().await;
        let third = cache.get_or_load(|| async { Ok(vec![9]) }).await.unwrap();
        assert_eq!(*third, vec![9]);
    }

    #[tokio::test]
    async fn test_failed_load_leaves_cache_empty() {
        let cache: CachedList<u32> = CachedList::new();
        let result = cache
            .get_or_load(|| async {
                Err(ClientError::Api {
                    status: 500,
                    message: "Failed".to_string(),
                })
            })
            .await;
        assert!(result.is_err());
        assert!(!cache.is_cached().await);
    }
}
