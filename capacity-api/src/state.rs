//! Application state for the API server

use capacity_db::{
    CapacityDatabase, CapacityService, DbError, EmployeeService, ProjectService, TransferService,
};
use std::sync::Arc;

/// API server state
#[derive(Clone)]
pub struct AppState {
    /// Database handle, for health checks
    pub database: Arc<CapacityDatabase>,
    /// Projects, task groups and metrics
    pub projects: Arc<ProjectService>,
    /// Employees and assignments
    pub employees: Arc<EmployeeService>,
    /// Capacity grid
    pub capacity: Arc<CapacityService>,
    /// Export / import
    pub transfer: Arc<TransferService>,
    /// API version
    pub version: String,
}

impl AppState {
    /// Create new app state from database, initializing its schema
    pub async fn new(database: Arc<CapacityDatabase>) -> Result<Self, DbError> {
        database.init_schema().await?;

        Ok(Self {
            projects: Arc::new(ProjectService::new(database.clone())),
            employees: Arc::new(EmployeeService::new(database.clone())),
            capacity: Arc::new(CapacityService::new(database.clone())),
            transfer: Arc::new(TransferService::new(database.clone())),
            database,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// State over a fresh in-memory database
    pub async fn in_memory() -> Result<Self, DbError> {
        Self::new(Arc::new(CapacityDatabase::open_in_memory()?)).await
    }
}
