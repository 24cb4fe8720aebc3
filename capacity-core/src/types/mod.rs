//! Capacity tracker domain types

mod capacity;
mod common;
mod employee;
mod project;
mod transfer;

pub use capacity::*;
pub use common::*;
pub use employee::*;
pub use project::*;
pub use transfer::*;
