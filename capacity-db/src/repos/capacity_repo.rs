//! Capacity repository

use rusqlite::{params, Connection, OptionalExtension};

use capacity_core::{CapacityFilter, CapacityKey, CapacityScope, CapacityWrite};

use crate::entities::CapacityRow;
use crate::error::DbResult;

/// Capacity repository
pub struct CapacityRepo<'c> {
    conn: &'c Connection,
}

impl<'c> CapacityRepo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Insert or overwrite a cell in one statement. `total` is computed
    /// here from the two factors and nowhere else.
    pub fn upsert(&self, write: &CapacityWrite, updated_at: &str) -> DbResult<CapacityRow> {
        let key = &write.key;
        let row = self.conn.query_row(
            &format!(
                "INSERT INTO capacity
                    (employee_id, project_id, country, task_group_id, metric_id,
                     time_per_unit, count, total, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(employee_id, project_id, country, task_group_id, metric_id)
                 DO UPDATE SET
                    time_per_unit = excluded.time_per_unit,
                    count = excluded.count,
                    total = excluded.total,
                    updated_at = excluded.updated_at
                 RETURNING {}",
                CapacityRow::COLUMNS
            ),
            params![
                key.employee_id,
                key.project_id,
                key.country,
                key.task_group_id,
                key.metric_id,
                write.time_per_unit,
                write.count,
                write.total(),
                updated_at,
            ],
            CapacityRow::from_row,
        )?;
        Ok(row)
    }

    pub fn get(&self, key: &CapacityKey) -> DbResult<Option<CapacityRow>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM capacity
                     WHERE employee_id = ?1 AND project_id = ?2 AND country = ?3
                       AND task_group_id = ?4 AND metric_id = ?5",
                    CapacityRow::COLUMNS
                ),
                params![
                    key.employee_id,
                    key.project_id,
                    key.country,
                    key.task_group_id,
                    key.metric_id,
                ],
                CapacityRow::from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn list(&self, filter: &CapacityFilter) -> DbResult<Vec<CapacityRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM capacity
             WHERE (?1 IS NULL OR employee_id = ?1)
               AND (?2 IS NULL OR project_id = ?2)
             ORDER BY id",
            CapacityRow::COLUMNS
        ))?;
        let rows = stmt
            .query_map(
                params![filter.employee_id, filter.project_id],
                CapacityRow::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn delete_by_employee(&self, employee_id: &str) -> DbResult<usize> {
        Ok(self.conn.execute(
            "DELETE FROM capacity WHERE employee_id = ?1",
            params![employee_id],
        )?)
    }

    pub fn delete_by_project(&self, project_id: &str) -> DbResult<usize> {
        Ok(self.conn.execute(
            "DELETE FROM capacity WHERE project_id = ?1",
            params![project_id],
        )?)
    }

    /// Sum of `total` over the scope; zero when no row matches
    pub fn sum(&self, scope: &CapacityScope) -> DbResult<f64> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(SUM(total), 0.0) FROM capacity
             WHERE employee_id = ?1 AND project_id = ?2
               AND (?3 IS NULL OR country = ?3)
               AND (?4 IS NULL OR task_group_id = ?4)",
            params![
                scope.employee_id,
                scope.project_id,
                scope.country,
                scope.task_group_id,
            ],
            |row| row.get(0),
        )?)
    }

    /// Rows whose stored total disagrees with its factors. An overflowing
    /// product is stored as zero and counts as consistent.
    pub fn count_inconsistent(&self) -> DbResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM capacity
             WHERE total != time_per_unit * count
               AND NOT (total = 0 AND ABS(time_per_unit * count) > 1.7976931348623157e308)",
            [],
            |row| row.get(0),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        crate::schema::apply(&mut conn).unwrap();
        conn.execute_batch(
            "INSERT INTO projects (id, name, countries) VALUES ('P', 'P', '[\"A\",\"B\"]');
             INSERT INTO task_groups (id, project_id, name) VALUES ('T', 'P', 'T');
             INSERT INTO task_groups (id, project_id, name) VALUES ('T2', 'P', 'T2');
             INSERT INTO metrics (id, task_group_id, name) VALUES ('M', 'T', 'M');
             INSERT INTO metrics (id, task_group_id, name) VALUES ('M2', 'T2', 'M2');
             INSERT INTO employees (id, name) VALUES ('E', 'E');
             INSERT INTO employees (id, name) VALUES ('F', 'F');",
        )
        .unwrap();
        conn
    }

    fn key(employee: &str, country: &str, task_group: &str, metric: &str) -> CapacityKey {
        CapacityKey {
            employee_id: employee.to_string(),
            project_id: "P".to_string(),
            country: country.to_string(),
            task_group_id: task_group.to_string(),
            metric_id: metric.to_string(),
        }
    }

    #[test]
    fn test_upsert_keeps_one_row_per_key() {
        let conn = setup();
        let repo = CapacityRepo::new(&conn);
        let k = key("E", "A", "T", "M");

        let first = repo
            .upsert(&CapacityWrite::new(k.clone(), 2.0, 3.0), "2025-01-01T00:00:00.000Z")
            .unwrap();
        let second = repo
            .upsert(&CapacityWrite::new(k.clone(), 4.0, 0.5), "2025-01-02T00:00:00.000Z")
            .unwrap();

        assert_eq!(first.total, 6.0);
        assert_eq!(second.id, first.id);
        assert_eq!(second.total, 2.0);
        assert_eq!(second.updated_at.as_deref(), Some("2025-01-02T00:00:00.000Z"));
        assert_eq!(repo.list(&CapacityFilter::all()).unwrap().len(), 1);
        assert_eq!(repo.get(&k).unwrap(), Some(second));
    }

    #[test]
    fn test_sum_scopes() {
        let conn = setup();
        let repo = CapacityRepo::new(&conn);
        let now = "2025-01-01T00:00:00.000Z";
        repo.upsert(&CapacityWrite::new(key("E", "A", "T", "M"), 2.0, 3.0), now).unwrap();
        repo.upsert(&CapacityWrite::new(key("E", "B", "T", "M"), 1.0, 1.0), now).unwrap();
        repo.upsert(&CapacityWrite::new(key("E", "A", "T2", "M2"), 0.5, 4.0), now).unwrap();
        repo.upsert(&CapacityWrite::new(key("F", "A", "T", "M"), 10.0, 10.0), now).unwrap();

        let scope = CapacityScope::project("E", "P");
        assert_eq!(repo.sum(&scope).unwrap(), 9.0);
        assert_eq!(repo.sum(&scope.clone().country("A")).unwrap(), 8.0);
        assert_eq!(repo.sum(&scope.clone().country("A").task_group("T")).unwrap(), 6.0);
        assert_eq!(repo.sum(&CapacityScope::project("E", "nope")).unwrap(), 0.0);
    }

    #[test]
    fn test_list_filters_and_bulk_delete() {
        let conn = setup();
        let repo = CapacityRepo::new(&conn);
        let now = "2025-01-01T00:00:00.000Z";
        repo.upsert(&CapacityWrite::new(key("E", "A", "T", "M"), 1.0, 1.0), now).unwrap();
        repo.upsert(&CapacityWrite::new(key("F", "A", "T", "M"), 1.0, 1.0), now).unwrap();

        assert_eq!(repo.list(&CapacityFilter::employee("E")).unwrap().len(), 1);
        assert_eq!(
            repo.list(&CapacityFilter::employee_project("F", "P")).unwrap().len(),
            1
        );
        assert_eq!(repo.delete_by_employee("E").unwrap(), 1);
        assert_eq!(repo.delete_by_employee("E").unwrap(), 0);
        assert_eq!(repo.delete_by_project("P").unwrap(), 1);
        assert_eq!(repo.count_inconsistent().unwrap(), 0);
    }

    #[test]
    fn test_overflowing_product_is_stored_as_zero() {
        let conn = setup();
        let repo = CapacityRepo::new(&conn);
        let row = repo
            .upsert(
                &CapacityWrite::new(key("E", "A", "T", "M"), 1e200, 1e200),
                "2025-01-01T00:00:00.000Z",
            )
            .unwrap();
        assert_eq!(row.total, 0.0);
        assert_eq!(row.time_per_unit, 1e200);
        assert_eq!(repo.count_inconsistent().unwrap(), 0);
    }

    #[test]
    fn test_upsert_rejects_unknown_parent() {
        let conn = setup();
        let result = CapacityRepo::new(&conn).upsert(
            &CapacityWrite::new(key("ghost", "A", "T", "M"), 1.0, 1.0),
            "2025-01-01T00:00:00.000Z",
        );
        assert!(result.is_err());
    }
}
