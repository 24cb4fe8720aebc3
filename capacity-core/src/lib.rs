//! Capacity Tracker Core
//!
//! Domain types and store interfaces for the capacity tracker:
//! - Projects with countries, per-country platform notes, task groups and metrics
//! - Employees assigned to projects and, per project, to a subset of its countries
//! - The capacity grid: time per unit x count = total, per
//!   (employee, project, country, task group, metric)
//!
//! Storage lives in `capacity-db`; the HTTP surface in `capacity-api`.

pub mod constants;
pub mod error;
pub mod ids;
pub mod store;
pub mod types;

pub use constants::*;
pub use error::*;
pub use types::*;
