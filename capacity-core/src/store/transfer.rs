//! Transfer Store - whole-database export and import

use async_trait::async_trait;

use super::Store;
use crate::error::StoreResult;
use crate::types::{ExportBundle, ImportBundle, ImportSummary};

/// Transfer Store trait
#[async_trait]
pub trait TransferStore: Store {
    /// Snapshot every project, employee and capacity cell
    async fn export_all(&self) -> StoreResult<ExportBundle>;

    /// Write a bundle in one transaction; nothing is kept on failure
    async fn import_all(&self, bundle: ImportBundle) -> StoreResult<ImportSummary>;
}
