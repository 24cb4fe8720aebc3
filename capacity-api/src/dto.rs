//! Data Transfer Objects for API requests and responses
//!
//! Request bodies for writes are the capacity-core input types
//! (`NewProject`, `EmployeeUpdate`, `CapacityInput`, ...). This module holds
//! the query strings and the response shapes that have no domain type.

use capacity_core::{CapacityFilter, CapacityKey, CapacityScope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Treat `?param=` the same as an absent parameter
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ============ Employee DTOs ============

/// `GET /employees` query
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeQuery {
    pub project_id: Option<String>,
}

impl EmployeeQuery {
    pub fn project_id(self) -> Option<String> {
        present(self.project_id)
    }
}

// ============ Capacity DTOs ============

/// `GET /capacity` query
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityQuery {
    pub employee_id: Option<String>,
    pub project_id: Option<String>,
}

impl From<CapacityQuery> for CapacityFilter {
    fn from(query: CapacityQuery) -> Self {
        Self {
            employee_id: present(query.employee_id),
            project_id: present(query.project_id),
        }
    }
}

/// `GET /capacity/entry` query
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryQuery {
    pub employee_id: Option<String>,
    pub project_id: Option<String>,
    pub country: Option<String>,
    pub task_group_id: Option<String>,
    pub metric_id: Option<String>,
}

impl EntryQuery {
    /// The cell key, or `None` when any part is missing
    pub fn into_key(self) -> Option<CapacityKey> {
        Some(CapacityKey {
            employee_id: self.employee_id?,
            project_id: self.project_id?,
            country: self.country?,
            task_group_id: self.task_group_id?,
            metric_id: self.metric_id?,
        })
    }
}

/// `GET /capacity/totals/*` query
///
/// Every parameter an endpoint uses is an equality filter. A missing one
/// compares against the empty string, so the sum is zero rather than
/// widening to all rows.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsQuery {
    pub employee_id: Option<String>,
    pub project_id: Option<String>,
    pub country: Option<String>,
    pub task_group_id: Option<String>,
}

impl TotalsQuery {
    pub fn project_scope(self) -> CapacityScope {
        CapacityScope::project(
            self.employee_id.unwrap_or_default(),
            self.project_id.unwrap_or_default(),
        )
    }

    pub fn country_scope(mut self) -> CapacityScope {
        let country = self.country.take().unwrap_or_default();
        self.project_scope().country(country)
    }

    pub fn task_group_scope(mut self) -> CapacityScope {
        let task_group = self.task_group_id.take().unwrap_or_default();
        self.country_scope().task_group(task_group)
    }
}

/// Totals response
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TotalResponse {
    pub total: f64,
}

// ============ Health DTOs ============

/// Health / readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Per-check results, readiness only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks: Option<BTreeMap<String, bool>>,
}
