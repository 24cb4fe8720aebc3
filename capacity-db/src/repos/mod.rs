//! Capacity repository implementations
//!
//! Repositories are thin, synchronous wrappers over a borrowed
//! [`rusqlite::Connection`]. A `rusqlite::Transaction` derefs to a
//! connection, so services compose several repositories inside one
//! transaction and commit once.

mod capacity_repo;
mod employee_repo;
mod project_repo;

pub use capacity_repo::*;
pub use employee_repo::*;
pub use project_repo::*;

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

/// Capacity database - main entry point for storage operations
///
/// Holds a single SQLite connection. Every call runs on the blocking
/// thread pool with the connection locked, which serializes writers.
#[derive(Clone)]
pub struct CapacityDatabase {
    conn: Arc<Mutex<Connection>>,
    location: String,
}

impl CapacityDatabase {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        debug!(path = %path.display(), journal_mode = %mode, "Opened database file");
        Self::from_connection(conn, path.display().to_string())
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> DbResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, ":memory:".to_string())
    }

    fn from_connection(conn: Connection, location: String) -> DbResult<Self> {
        conn.execute_batch(crate::schema::CONNECTION_PRAGMAS)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location,
        })
    }

    /// Open a file database and initialize its schema
    pub async fn connect(path: impl AsRef<Path>) -> DbResult<Self> {
        let db = Self::open(path)?;
        db.init_schema().await?;
        Ok(db)
    }

    /// In-memory database with the schema applied
    pub async fn connect_in_memory() -> DbResult<Self> {
        let db = Self::open_in_memory()?;
        db.init_schema().await?;
        Ok(db)
    }

    /// Where the database lives (a path or `:memory:`)
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Create tables and run migrations
    pub async fn init_schema(&self) -> DbResult<()> {
        self.call(crate::schema::apply)
            .await
            .map_err(|e| DbError::SchemaError(e.to_string()))?;
        info!(location = %self.location, "Database schema ready");
        Ok(())
    }

    /// Check database health
    pub async fn health_check(&self) -> DbResult<bool> {
        self.call(|conn| {
            let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
            Ok(one == 1)
        })
        .await
    }

    /// Run `f` against the connection on the blocking pool
    pub async fn call<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&mut Connection) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| DbError::Poisoned)?;
            f(&mut guard)
        })
        .await
        .map_err(|e| DbError::Task(e.to_string()))?
    }

    /// Run `f` inside a transaction, committing only when it succeeds
    pub async fn transaction<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.call(move |conn| {
            let tx = conn.transaction()?;
            let out = f(&tx)?;
            tx.commit()?;
            Ok(out)
        })
        .await
    }
}
