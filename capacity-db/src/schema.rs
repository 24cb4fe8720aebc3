//! SQLite schema for the capacity tracker
//!
//! Foreign keys cascade on delete: removing a project removes its task
//! groups, their metrics, its employee assignments and every capacity row
//! that references any of them. Removing an employee removes their
//! assignments and capacity rows.

use rusqlite::Connection;
use tracing::info;

use crate::error::DbResult;

/// Current schema version, stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: i32 = 2;

/// Pragmas applied to every connection
pub const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

/// Complete schema
pub const CAPACITY_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    countries TEXT NOT NULL DEFAULT '[]',
    country_platforms TEXT NOT NULL DEFAULT '{}'
);

CREATE TABLE IF NOT EXISTS task_groups (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    name TEXT NOT NULL,
    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
);
CREATE INDEX IF NOT EXISTS idx_task_groups_project ON task_groups(project_id);

CREATE TABLE IF NOT EXISTS metrics (
    id TEXT PRIMARY KEY,
    task_group_id TEXT NOT NULL,
    name TEXT NOT NULL,
    unit TEXT NOT NULL DEFAULT 'hours',
    FOREIGN KEY (task_group_id) REFERENCES task_groups(id) ON DELETE CASCADE
);
CREATE INDEX IF NOT EXISTS idx_metrics_task_group ON metrics(task_group_id);

CREATE TABLE IF NOT EXISTS employees (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL DEFAULT '',
    annual_working_hours REAL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS employee_projects (
    employee_id TEXT NOT NULL,
    project_id TEXT NOT NULL,
    position INTEGER NOT NULL DEFAULT 0,
    countries TEXT NOT NULL DEFAULT '[]',
    PRIMARY KEY (employee_id, project_id),
    FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE,
    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
);
CREATE INDEX IF NOT EXISTS idx_employee_projects_project ON employee_projects(project_id);

CREATE TABLE IF NOT EXISTS capacity (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    employee_id TEXT NOT NULL,
    project_id TEXT NOT NULL,
    country TEXT NOT NULL,
    task_group_id TEXT NOT NULL,
    metric_id TEXT NOT NULL,
    time_per_unit REAL NOT NULL DEFAULT 0,
    count REAL NOT NULL DEFAULT 0,
    total REAL NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (employee_id, project_id, country, task_group_id, metric_id),
    FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE,
    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE,
    FOREIGN KEY (task_group_id) REFERENCES task_groups(id) ON DELETE CASCADE,
    FOREIGN KEY (metric_id) REFERENCES metrics(id) ON DELETE CASCADE
);
CREATE INDEX IF NOT EXISTS idx_capacity_employee_project ON capacity(employee_id, project_id);
CREATE INDEX IF NOT EXISTS idx_capacity_project ON capacity(project_id);
"#;

/// Create tables and run migrations
pub fn apply(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch(CONNECTION_PRAGMAS)?;
    conn.execute_batch(CAPACITY_SCHEMA)?;

    if !has_column(conn, "employees", "annual_working_hours")? {
        conn.execute_batch("ALTER TABLE employees ADD COLUMN annual_working_hours REAL")?;
    }

    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version < SCHEMA_VERSION {
        let migrated = migrate_legacy_employee_columns(conn)?;
        if migrated > 0 {
            info!(count = migrated, "Migrated legacy employee assignments");
        }
        conn.execute_batch(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))?;
    }

    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Older databases kept a single `default_project_id` and a JSON
/// `assigned_countries` list on the employee row. Copy those into
/// `employee_projects` for employees with no assignment yet, skipping
/// projects that no longer exist.
fn migrate_legacy_employee_columns(conn: &mut Connection) -> DbResult<usize> {
    if !has_column(conn, "employees", "default_project_id")? {
        return Ok(0);
    }
    let with_countries = has_column(conn, "employees", "assigned_countries")?;
    let countries_expr = if with_countries {
        "COALESCE(NULLIF(e.assigned_countries, ''), '[]')"
    } else {
        "'[]'"
    };

    let tx = conn.transaction()?;
    let migrated = tx.execute(
        &format!(
            "INSERT INTO employee_projects (employee_id, project_id, position, countries)
             SELECT e.id, e.default_project_id, 0, {}
             FROM employees e
             JOIN projects p ON p.id = e.default_project_id
             WHERE e.default_project_id IS NOT NULL AND e.default_project_id != ''
               AND NOT EXISTS (SELECT 1 FROM employee_projects ep WHERE ep.employee_id = e.id)",
            countries_expr
        ),
        [],
    )?;
    tx.commit()?;
    Ok(migrated)
}
