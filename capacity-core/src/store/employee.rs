//! Employee Store - employees and their assignments

use async_trait::async_trait;

use super::Store;
use crate::error::StoreResult;
use crate::types::{Employee, EmployeeUpdate, NewEmployee};

/// Employee Store trait
#[async_trait]
pub trait EmployeeStore: Store {
    async fn create_employee(&self, employee: NewEmployee) -> StoreResult<Employee>;

    async fn get_employee(&self, id: &str) -> StoreResult<Option<Employee>>;

    /// List employees, optionally only those assigned to a project
    async fn list_employees(&self, project_id: Option<&str>) -> StoreResult<Vec<Employee>>;

    async fn update_employee(&self, id: &str, update: EmployeeUpdate) -> StoreResult<Employee>;

    /// Delete an employee and all of their capacity entries
    async fn delete_employee(&self, id: &str) -> StoreResult<()>;
}
