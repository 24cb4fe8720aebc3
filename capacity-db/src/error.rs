//! Capacity database error types

use capacity_core::{EntityKind, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Blocking task failed: {0}")]
    Task(String),

    #[error("Database connection lock poisoned")]
    Poisoned,
}

impl DbError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<DbError> for StoreError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { kind, id } => StoreError::NotFound { kind, id },
            DbError::Validation(msg) => StoreError::Validation(msg),
            other => StoreError::Storage(other.to_string()),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;
