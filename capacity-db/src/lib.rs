//! Capacity Database Layer
//!
//! Provides SQLite storage for the capacity tracker and implements the
//! store traits from capacity-core on top of it.
//!
//! # Layout
//!
//! - `CapacityDatabase` - connection handle; runs work on the blocking pool
//! - `entities` - row structs and row→domain translation
//! - `repos` - synchronous repositories over a borrowed connection
//! - `services` - async store implementations with transactions
//! - `validation` - write-time rules the schema does not enforce
//! - `seed` - default project for a fresh database
//!
//! # Example
//!
//! ```ignore
//! use capacity_db::{CapacityDatabase, ProjectService};
//! use std::sync::Arc;
//!
//! async fn example() {
//!     let db = Arc::new(CapacityDatabase::connect("worktracker.db").await.unwrap());
//!     capacity_db::seed::seed_if_empty(&db).await.unwrap();
//!     let projects = ProjectService::new(db.clone());
//! }
//! ```

pub mod entities;
pub mod error;
pub mod repos;
pub mod schema;
pub mod seed;
pub mod services;
pub mod validation;

// Re-export main types
pub use error::*;
pub use repos::{CapacityDatabase, WriteMode};
pub use schema::{CAPACITY_SCHEMA, SCHEMA_VERSION};
pub use seed::{seed_if_empty, SEED_PROJECT_ID};
pub use services::{CapacityService, EmployeeService, ProjectService, TransferService};
