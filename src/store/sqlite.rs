use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, params_from_iter};
use tracing::info;

use super::Store;
use super::query::Query;
use super::schema::{SCHEMA, TABLES, TableSchema};
use super::value::{Row, Value, decode};
use crate::error::{Error, Result};

pub struct SqliteStore {
    conn: Mutex<Option<Connection>>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref())?;

        conn.pragma_update(None, "journal_mode", "WAL")?;

        info!("Opened store at {}", db_path.as_ref().display());

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(Error::Closed)?;
        f(conn)
    }
}

fn column_list(table: &TableSchema) -> String {
    table
        .columns
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn order_by(table: &TableSchema) -> String {
    table.primary_key().collect::<Vec<_>>().join(", ")
}

fn key_condition(table: &TableSchema, key: &[Value]) -> Result<String> {
    let columns: Vec<&str> = table.primary_key().collect();
    if columns.len() != key.len() {
        return Err(Error::InvalidQuery(format!(
            "{} expects {} key values, got {}",
            table.name,
            columns.len(),
            key.len()
        )));
    }
    if key.contains(&Value::Null) {
        return Err(Error::InvalidQuery(format!(
            "{} key values cannot be null",
            table.name
        )));
    }
    Ok(columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{c} = ?{}", i + 1))
        .collect::<Vec<_>>()
        .join(" AND "))
}

fn check_row(table: &TableSchema, row: &Row) -> Result<()> {
    if let Some((column, _)) = row.iter().find(|(c, _)| table.column(c).is_none()) {
        return Err(Error::InvalidQuery(format!(
            "table {} has no column {column}",
            table.name
        )));
    }
    for key in table.primary_key() {
        if matches!(row.get(key), None | Some(Value::Null)) {
            return Err(Error::InvalidQuery(format!(
                "row for {} is missing key column {key}",
                table.name
            )));
        }
    }
    Ok(())
}

fn read_row(table: &TableSchema, raw: &rusqlite::Row<'_>) -> Result<Row> {
    let mut row = Row::new();
    for (idx, column) in table.columns.iter().enumerate() {
        row.set(column.name, decode(column, raw.get_ref(idx)?)?);
    }
    Ok(row)
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })?;
        info!("Schema synchronized for {} tables", TABLES.len());
        Ok(())
    }

    fn insert(&self, table: &TableSchema, row: &Row) -> Result<()> {
        check_row(table, row)?;

        let columns: Vec<&str> = row.iter().map(|(c, _)| c).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
            table.name,
            columns.join(", "),
            placeholders.join(", ")
        );

        self.with_conn(|conn| {
            conn.execute(&sql, params_from_iter(row.iter().map(|(_, v)| v)))?;
            Ok(())
        })
    }

    fn get(&self, table: &TableSchema, key: &[Value]) -> Result<Option<Row>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {}",
            column_list(table),
            table.name,
            key_condition(table, key)?
        );

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(key.iter()))?;
            match rows.next()? {
                Some(raw) => read_row(table, raw).map(Some),
                None => Ok(None),
            }
        })
    }

    fn select(&self, table: &TableSchema, query: &Query) -> Result<Vec<Row>> {
        query.check(table)?;

        let (where_sql, params) = query.where_clause();
        let mut sql = format!(
            "SELECT {} FROM {}{} ORDER BY {}",
            column_list(table),
            table.name,
            where_sql,
            order_by(table)
        );
        if let Some(limit) = query.max_rows() {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(params))?;
            let mut out = Vec::new();
            while let Some(raw) = rows.next()? {
                out.push(read_row(table, raw)?);
            }
            Ok(out)
        })
    }

    fn count(&self, table: &TableSchema, query: &Query) -> Result<i64> {
        if !query.filtering_allowed() {
            return Err(Error::FilteringRequired {
                table: table.name,
                reason: "count reads every partition".to_string(),
            });
        }
        query.check(table)?;

        let (where_sql, params) = query.where_clause();
        let sql = format!("SELECT COUNT(*) FROM {}{}", table.name, where_sql);

        self.with_conn(|conn| {
            conn.query_row(&sql, params_from_iter(params), |r| r.get(0))
                .map_err(Error::from)
        })
    }

    fn update(&self, table: &TableSchema, row: &Row) -> Result<()> {
        check_row(table, row)?;

        let changes: Vec<(&str, &Value)> = row
            .iter()
            .filter(|(c, _)| !table.is_key_column(c))
            .collect();
        if changes.is_empty() {
            return Err(Error::InvalidQuery(format!(
                "update on {} has no non-key columns",
                table.name
            )));
        }

        let assignments: Vec<String> = changes
            .iter()
            .enumerate()
            .map(|(i, (c, _))| format!("{c} = ?{}", i + 1))
            .collect();
        let conditions: Vec<String> = table
            .primary_key()
            .enumerate()
            .map(|(i, k)| format!("{k} = ?{}", changes.len() + i + 1))
            .collect();
        let params: Vec<&Value> = changes
            .iter()
            .map(|(_, v)| *v)
            .chain(table.primary_key().filter_map(|k| row.get(k)))
            .collect();

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            table.name,
            assignments.join(", "),
            conditions.join(" AND ")
        );

        let rows = self.with_conn(|conn| Ok(conn.execute(&sql, params_from_iter(params))?))?;
        if rows == 0 {
            return Err(Error::NotFound(table.name));
        }
        Ok(())
    }

    fn delete(&self, table: &TableSchema, key: &[Value]) -> Result<bool> {
        let sql = format!(
            "DELETE FROM {} WHERE {}",
            table.name,
            key_condition(table, key)?
        );
        let rows = self.with_conn(|conn| Ok(conn.execute(&sql, params_from_iter(key.iter()))?))?;
        Ok(rows > 0)
    }

    fn truncate(&self, table: &TableSchema) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(&format!("DELETE FROM {}", table.name), [])?;
            Ok(())
        })
    }

    fn close(&self) -> Result<()> {
        let Some(conn) = self.lock().take() else {
            return Ok(());
        };
        conn.close().map_err(|(_, e)| Error::Database(e))?;
        info!("Store connection closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::{STUDENTS, TRIPS};
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;
    use uuid::Uuid;

    fn open_store() -> (TempDir, SqliteStore) {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        (temp, store)
    }

    fn student_row(id: Uuid, name: &str) -> Row {
        Row::new()
            .with("id", id)
            .with("full_name", name)
            .with("enrollment_number", "500001")
            .with("email", "bia@ufc.br")
            .with("phone", None::<String>)
            .with("password_hash", None::<String>)
    }

    fn trip_row(route_id: Uuid, departure: chrono::DateTime<Utc>, driver_id: Uuid) -> Row {
        Row::new()
            .with("route_id", route_id)
            .with("departure_date", departure)
            .with("id", Uuid::new_v4())
            .with("vehicle_id", Uuid::new_v4())
            .with("driver_id", driver_id)
            .with("departure_time", departure)
            .with("seats_available", 40)
            .with("status", "scheduled")
    }

    #[test]
    fn test_initialize_creates_tables() {
        let (_temp, store) = open_store();

        let guard = store.lock();
        let conn = guard.as_ref().unwrap();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        for table in TABLES {
            assert!(tables.contains(&table.name.to_string()), "{}", table.name);
        }
    }

    #[test]
    fn test_table_schemas_match_created_columns() {
        let (_temp, store) = open_store();

        let guard = store.lock();
        let conn = guard.as_ref().unwrap();
        for table in TABLES {
            let columns: Vec<String> = conn
                .prepare(&format!("PRAGMA table_info({})", table.name))
                .unwrap()
                .query_map([], |row| row.get(1))
                .unwrap()
                .collect::<std::result::Result<Vec<_>, _>>()
                .unwrap();
            let expected: Vec<String> = table.columns.iter().map(|c| c.name.to_string()).collect();
            assert_eq!(columns, expected, "{}", table.name);
        }
    }

    #[test]
    fn test_insert_get_update_delete() {
        let (_temp, store) = open_store();
        let id = Uuid::new_v4();

        store.insert(&STUDENTS, &student_row(id, "Beatriz Lima")).unwrap();

        let fetched = store.get(&STUDENTS, &[Value::Uuid(id)]).unwrap().unwrap();
        assert_eq!(fetched.get("full_name"), Some(&Value::from("Beatriz Lima")));

        let changes = Row::new().with("id", id).with("phone", "85 99999-0000");
        store.update(&STUDENTS, &changes).unwrap();
        let fetched = store.get(&STUDENTS, &[Value::Uuid(id)]).unwrap().unwrap();
        assert_eq!(fetched.get("phone"), Some(&Value::from("85 99999-0000")));
        assert_eq!(fetched.get("full_name"), Some(&Value::from("Beatriz Lima")));

        assert!(store.delete(&STUDENTS, &[Value::Uuid(id)]).unwrap());
        assert!(!store.delete(&STUDENTS, &[Value::Uuid(id)]).unwrap());
        assert!(store.get(&STUDENTS, &[Value::Uuid(id)]).unwrap().is_none());
    }

    #[test]
    fn test_insert_with_existing_key_overwrites() {
        let (_temp, store) = open_store();
        let id = Uuid::new_v4();

        store.insert(&STUDENTS, &student_row(id, "First")).unwrap();
        store.insert(&STUDENTS, &student_row(id, "Second")).unwrap();

        let all = store
            .select(&STUDENTS, &Query::new().eq("id", id))
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].get("full_name"), Some(&Value::from("Second")));
    }

    #[test]
    fn test_update_missing_row_is_not_found() {
        let (_temp, store) = open_store();
        let changes = Row::new().with("id", Uuid::new_v4()).with("phone", "1");
        assert!(matches!(
            store.update(&STUDENTS, &changes),
            Err(Error::NotFound("students"))
        ));
    }

    #[test]
    fn test_get_with_wrong_key_arity_is_invalid() {
        let (_temp, store) = open_store();
        let result = store.get(&TRIPS, &[Value::Uuid(Uuid::new_v4())]);
        assert!(matches!(result, Err(Error::InvalidQuery(_))));
    }

    #[test]
    fn test_select_orders_by_clustering_key_and_limits() {
        let (_temp, store) = open_store();
        let route = Uuid::new_v4();
        let driver = Uuid::new_v4();
        let base = Utc.with_ymd_and_hms(2030, 3, 1, 7, 0, 0).unwrap();

        for days in [3, 1, 2] {
            store
                .insert(&TRIPS, &trip_row(route, base + Duration::days(days), driver))
                .unwrap();
        }

        let rows = store
            .select(&TRIPS, &Query::new().eq("route_id", route).limit(2))
            .unwrap();
        let dates: Vec<&Value> = rows.iter().map(|r| r.get("departure_date").unwrap()).collect();
        assert_eq!(
            dates,
            vec![
                &Value::Timestamp(base + Duration::days(1)),
                &Value::Timestamp(base + Duration::days(2)),
            ]
        );
    }

    #[test]
    fn test_select_range_on_timestamp() {
        let (_temp, store) = open_store();
        let route = Uuid::new_v4();
        let driver = Uuid::new_v4();
        let now = Utc::now();

        store
            .insert(&TRIPS, &trip_row(route, now - Duration::days(2), driver))
            .unwrap();
        store
            .insert(&TRIPS, &trip_row(route, now + Duration::days(2), driver))
            .unwrap();

        let query = Query::new()
            .eq("driver_id", driver)
            .gte("departure_date", now)
            .allow_filtering();
        assert_eq!(store.select(&TRIPS, &query).unwrap().len(), 1);
    }

    #[test]
    fn test_select_without_opt_in_is_rejected() {
        let (_temp, store) = open_store();
        let query = Query::new().eq("status", "scheduled");
        assert!(matches!(
            store.select(&TRIPS, &query),
            Err(Error::FilteringRequired { .. })
        ));
    }

    #[test]
    fn test_count_requires_filtering() {
        let (_temp, store) = open_store();
        store
            .insert(&STUDENTS, &student_row(Uuid::new_v4(), "A"))
            .unwrap();
        store
            .insert(&STUDENTS, &student_row(Uuid::new_v4(), "B"))
            .unwrap();

        assert!(matches!(
            store.count(&STUDENTS, &Query::new()),
            Err(Error::FilteringRequired { .. })
        ));
        assert_eq!(
            store
                .count(&STUDENTS, &Query::new().allow_filtering())
                .unwrap(),
            2
        );
    }

    #[test]
    fn test_closed_store_rejects_calls() {
        let (_temp, store) = open_store();
        store.close().unwrap();
        assert!(matches!(
            store.get(&STUDENTS, &[Value::Uuid(Uuid::new_v4())]),
            Err(Error::Closed)
        ));
        store.close().unwrap();
    }
}
