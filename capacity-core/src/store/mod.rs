//! Store interfaces
//!
//! Four stores back the tracker:
//! - Project store: projects with their task groups and metrics
//! - Employee store: employees and their project/country assignments
//! - Capacity store: the capacity grid, its upsert and its totals
//! - Transfer store: export and import of everything above
//!
//! Every store can check the invariants the storage engine does not enforce.

mod capacity;
mod employee;
mod project;
mod transfer;

pub use capacity::*;
pub use employee::*;
pub use project::*;
pub use transfer::*;

use crate::error::StoreResult;
use async_trait::async_trait;

/// Base trait for all store implementations
#[async_trait]
pub trait Store: Send + Sync {
    /// Get the store name
    fn name(&self) -> &'static str;

    /// Verify invariants not enforced by the storage engine
    async fn verify_integrity(&self) -> StoreResult<bool>;
}
