//! Capacity Store - the capacity grid
//!
//! Writes go through a single atomic upsert keyed on the five-column cell
//! key; concurrent writers to the same cell resolve last-writer-wins on the
//! whole row.

use async_trait::async_trait;

use super::Store;
use crate::error::StoreResult;
use crate::types::{CapacityEntry, CapacityFilter, CapacityKey, CapacityScope, CapacityWrite};

/// Capacity Store trait
#[async_trait]
pub trait CapacityStore: Store {
    /// Insert or overwrite a cell; returns the stored row
    async fn upsert_entry(&self, write: CapacityWrite) -> StoreResult<CapacityEntry>;

    /// Get a cell; a missing cell is `None`, not an error
    async fn get_entry(&self, key: &CapacityKey) -> StoreResult<Option<CapacityEntry>>;

    /// List cells matching all supplied filters
    async fn list_entries(&self, filter: &CapacityFilter) -> StoreResult<Vec<CapacityEntry>>;

    /// Delete every cell of an employee; returns the number removed
    async fn delete_by_employee(&self, employee_id: &str) -> StoreResult<u64>;

    /// Delete every cell of a project; returns the number removed
    async fn delete_by_project(&self, project_id: &str) -> StoreResult<u64>;

    /// Sum of `total` over the scope, zero when nothing matches
    async fn sum_total(&self, scope: &CapacityScope) -> StoreResult<f64>;
}
