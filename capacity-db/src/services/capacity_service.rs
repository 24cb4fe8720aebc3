//! Capacity Store Service Implementation

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use capacity_core::store::{CapacityStore, Store};
use capacity_core::{
    CapacityEntry, CapacityFilter, CapacityKey, CapacityScope, CapacityWrite, StoreResult,
};

use crate::entities::{now_timestamp, CapacityRow};
use crate::repos::{CapacityDatabase, CapacityRepo};

/// Capacity Store Service
pub struct CapacityService {
    database: Arc<CapacityDatabase>,
}

impl CapacityService {
    /// Create a new Capacity Service
    pub fn new(database: Arc<CapacityDatabase>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl Store for CapacityService {
    fn name(&self) -> &'static str {
        "capacity"
    }

    async fn verify_integrity(&self) -> StoreResult<bool> {
        let inconsistent = self
            .database
            .call(|conn| CapacityRepo::new(conn).count_inconsistent())
            .await?;
        if inconsistent > 0 {
            warn!(count = inconsistent, "Capacity rows with stale totals");
        }
        Ok(inconsistent == 0)
    }
}

#[async_trait]
impl CapacityStore for CapacityService {
    async fn upsert_entry(&self, write: CapacityWrite) -> StoreResult<CapacityEntry> {
        let row = self
            .database
            .call(move |conn| CapacityRepo::new(conn).upsert(&write, &now_timestamp()))
            .await?;
        debug!(
            employee_id = %row.employee_id,
            project_id = %row.project_id,
            country = %row.country,
            metric_id = %row.metric_id,
            total = row.total,
            "Capacity entry saved"
        );
        Ok(row.into_domain())
    }

    async fn get_entry(&self, key: &CapacityKey) -> StoreResult<Option<CapacityEntry>> {
        let key = key.clone();
        let row = self
            .database
            .call(move |conn| CapacityRepo::new(conn).get(&key))
            .await?;
        Ok(row.map(CapacityRow::into_domain))
    }

    async fn list_entries(&self, filter: &CapacityFilter) -> StoreResult<Vec<CapacityEntry>> {
        let filter = filter.clone();
        let rows = self
            .database
            .call(move |conn| CapacityRepo::new(conn).list(&filter))
            .await?;
        Ok(rows.into_iter().map(CapacityRow::into_domain).collect())
    }

    async fn delete_by_employee(&self, employee_id: &str) -> StoreResult<u64> {
        let id = employee_id.to_string();
        let removed = self
            .database
            .call(move |conn| CapacityRepo::new(conn).delete_by_employee(&id))
            .await?;
        info!(employee_id = %employee_id, count = removed, "Employee capacity cleared");
        Ok(removed as u64)
    }

    async fn delete_by_project(&self, project_id: &str) -> StoreResult<u64> {
        let id = project_id.to_string();
        let removed = self
            .database
            .call(move |conn| CapacityRepo::new(conn).delete_by_project(&id))
            .await?;
        info!(project_id = %project_id, count = removed, "Project capacity cleared");
        Ok(removed as u64)
    }

    async fn sum_total(&self, scope: &CapacityScope) -> StoreResult<f64> {
        let scope = scope.clone();
        Ok(self
            .database
            .call(move |conn| CapacityRepo::new(conn).sum(&scope))
            .await?)
    }
}
