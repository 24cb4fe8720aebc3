//! Capacity Tracker API Server
//!
//! JSON resource layer over the capacity stores. Bodies use camelCase keys;
//! errors are `{"error": "...", "code": "..."}` with 400, 404 or 500.
//!
//! ## Endpoints
//!
//! ### Projects
//! - GET /api/projects - List projects (nested task groups and metrics)
//! - POST /api/projects - Create project
//! - GET /api/projects/:id - Get project
//! - PUT /api/projects/:id - Update project
//! - DELETE /api/projects/:id - Delete project (cascades)
//! - POST /api/projects/:id/task-groups - Create task group
//! - PUT /api/projects/task-groups/:id - Rename task group
//! - DELETE /api/projects/task-groups/:id - Delete task group
//! - POST /api/projects/task-groups/:id/metrics - Create metric
//! - PUT /api/projects/metrics/:id - Update metric
//! - DELETE /api/projects/metrics/:id - Delete metric
//!
//! ### Employees
//! - GET /api/employees?projectId= - List employees
//! - POST /api/employees - Create employee
//! - GET /api/employees/:id - Get employee
//! - PUT /api/employees/:id - Update employee
//! - DELETE /api/employees/:id - Delete employee
//!
//! ### Capacity
//! - GET /api/capacity?employeeId=&projectId= - List entries
//! - GET /api/capacity/entry - Get one cell (or null)
//! - POST /api/capacity - Upsert a cell
//! - DELETE /api/capacity/employee/:id - Delete an employee's cells
//! - DELETE /api/capacity/project/:id - Delete a project's cells
//! - GET /api/capacity/totals/{task-group,country,project} - Sums
//!
//! ### Transfer and health
//! - GET /api/export, POST /api/import
//! - GET /health, GET /ready

pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;
pub mod server;
pub mod state;

pub use config::*;
pub use dto::*;
pub use error::*;
pub use extract::ApiJson;
pub use routes::create_router;
pub use server::*;
pub use state::*;
