//! Store Service Implementations
//!
//! Concrete implementations of the store traits defined in capacity-core,
//! built on the capacity-db repositories.

pub mod capacity_service;
pub mod employee_service;
pub mod project_service;
pub mod transfer_service;

pub use capacity_service::CapacityService;
pub use employee_service::EmployeeService;
pub use project_service::ProjectService;
pub use transfer_service::TransferService;
