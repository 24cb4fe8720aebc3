//! Transfer Store Service Implementation
//!
//! Export reads every table under one lock so the snapshot is consistent.
//! Import writes projects, employees and capacity in a single transaction;
//! existing ids are overwritten and capacity totals are recomputed.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use capacity_core::store::{Store, TransferStore};
use capacity_core::{CapacityFilter, ExportBundle, ImportBundle, ImportSummary, StoreResult};

use crate::entities::{now_timestamp, CapacityRow};
use crate::repos::{CapacityDatabase, CapacityRepo, EmployeeRepo, ProjectRepo, WriteMode};
use crate::services::employee_service::write_employee;
use crate::services::project_service::write_project_tree;

/// Transfer Store Service
pub struct TransferService {
    database: Arc<CapacityDatabase>,
}

impl TransferService {
    /// Create a new Transfer Service
    pub fn new(database: Arc<CapacityDatabase>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl Store for TransferService {
    fn name(&self) -> &'static str {
        "transfer"
    }

    async fn verify_integrity(&self) -> StoreResult<bool> {
        Ok(self.database.health_check().await?)
    }
}

#[async_trait]
impl TransferStore for TransferService {
    async fn export_all(&self) -> StoreResult<ExportBundle> {
        let bundle = self
            .database
            .call(|conn| {
                Ok(ExportBundle {
                    projects: ProjectRepo::new(conn).load_all()?,
                    employees: EmployeeRepo::new(conn).load_all(None)?,
                    capacity: CapacityRepo::new(conn)
                        .list(&CapacityFilter::all())?
                        .into_iter()
                        .map(CapacityRow::into_domain)
                        .collect(),
                    exported_at: Utc::now(),
                })
            })
            .await?;

        info!(
            projects = bundle.projects.len(),
            employees = bundle.employees.len(),
            capacity = bundle.capacity.len(),
            "Exported tracker data"
        );
        Ok(bundle)
    }

    async fn import_all(&self, bundle: ImportBundle) -> StoreResult<ImportSummary> {
        let summary = self
            .database
            .transaction(move |conn| {
                let mut summary = ImportSummary::default();
                for project in bundle.projects {
                    write_project_tree(conn, project, WriteMode::Upsert)?;
                    summary.projects += 1;
                }
                for employee in bundle.employees {
                    write_employee(conn, employee, WriteMode::Upsert)?;
                    summary.employees += 1;
                }
                let capacity = CapacityRepo::new(conn);
                let now = now_timestamp();
                for input in bundle.capacity {
                    capacity.upsert(&input.into_write(), &now)?;
                    summary.capacity += 1;
                }
                Ok(summary)
            })
            .await?;

        info!(
            projects = summary.projects,
            employees = summary.employees,
            capacity = summary.capacity,
            "Imported tracker data"
        );
        Ok(summary)
    }
}
