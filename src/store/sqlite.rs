//! SQLite-backed [`Database`]
//!
//! A single connection guarded by a mutex. File databases run in WAL mode
//! with a busy timeout so a second process (e.g. a seeding script) can write
//! while the server reads.

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::{Database, QueryResults, Row, RunResult, StoreError};
use crate::query::{BindValue, Statement};

impl ToSql for BindValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Text(s) => ToSqlOutput::from(s.as_str()),
            Self::Integer(i) => ToSqlOutput::from(*i),
            Self::Real(f) => ToSqlOutput::from(*f),
        })
    }
}

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Open (or create) a database file
    pub fn open(path: &str, busy_timeout_ms: u64) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    /// Execute a batch of `;`-separated statements without binds
    pub fn execute_batch(&self, sql: &str) -> Result<(), StoreError> {
        self.lock()?.execute_batch(sql)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl Database for SqliteDatabase {
    fn run(&self, statement: &Statement) -> Result<RunResult, StoreError> {
        let conn = self.lock()?;
        let changes = conn.execute(&statement.sql, params_from_iter(statement.binds.iter()))?;
        Ok(RunResult {
            changes,
            last_row_id: conn.last_insert_rowid(),
        })
    }

    fn all(&self, statement: &Statement) -> Result<QueryResults, StoreError> {
        let conn = self.lock()?;
        let results = query_rows(&conn, statement, None)?;
        Ok(QueryResults { results })
    }

    fn first(&self, statement: &Statement) -> Result<Option<Row>, StoreError> {
        let conn = self.lock()?;
        let rows = query_rows(&conn, statement, Some(1))?;
        Ok(rows.into_iter().next())
    }
}

fn query_rows(
    conn: &Connection,
    statement: &Statement,
    limit: Option<usize>,
) -> rusqlite::Result<Vec<Row>> {
    let mut prepared = conn.prepare(&statement.sql)?;
    let columns: Vec<String> = prepared
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let mut rows = prepared.query(params_from_iter(statement.binds.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut mapped = Row::new();
        for (idx, name) in columns.iter().enumerate() {
            mapped.insert(name.clone(), to_json(row.get_ref(idx)?));
        }
        out.push(mapped);
        if limit.is_some_and(|max| out.len() >= max) {
            break;
        }
    }
    Ok(out)
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::from(bytes.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch() -> SqliteDatabase {
        let db = SqliteDatabase::open_in_memory().unwrap();
        db.execute_batch("CREATE TABLE t (name TEXT, qty INTEGER, price REAL, raw BLOB);")
            .unwrap();
        db
    }

    #[test]
    fn test_run_reports_changes_and_rowid() {
        let db = scratch();
        let stmt = Statement::new("INSERT INTO t (name, qty, price) VALUES (?, ?, ?)")
            .bind(BindValue::Text("a".into()))
            .bind(BindValue::Integer(2))
            .bind(BindValue::Real(1.5));
        let first = db.run(&stmt).unwrap();
        let second = db.run(&stmt).unwrap();
        assert_eq!(first.changes, 1);
        assert_eq!(second.last_row_id, first.last_row_id + 1);
    }

    #[test]
    fn test_all_maps_column_types() {
        let db = scratch();
        db.execute_batch("INSERT INTO t VALUES ('x', 3, 2.25, x'0102');")
            .unwrap();
        let rows = db.all(&Statement::new("SELECT * FROM t")).unwrap().results;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("x"));
        assert_eq!(rows[0]["qty"], json!(3));
        assert_eq!(rows[0]["price"], json!(2.25));
        assert_eq!(rows[0]["raw"], json!([1, 2]));
    }

    #[test]
    fn test_first_returns_none_when_empty() {
        let db = scratch();
        assert!(db.first(&Statement::new("SELECT * FROM t")).unwrap().is_none());
        assert!(db.ping().is_ok());
    }

    #[test]
    fn test_binds_are_not_interpolated() {
        let db = scratch();
        let hostile = "x'); DROP TABLE t; --";
        let insert = Statement::new("INSERT INTO t (name) VALUES (?)")
            .bind(BindValue::Text(hostile.into()));
        db.run(&insert).unwrap();
        let row = db
            .first(&Statement::new("SELECT name FROM t"))
            .unwrap()
            .unwrap();
        assert_eq!(row["name"], json!(hostile));
    }

    #[test]
    fn test_sql_error_surfaces() {
        let db = scratch();
        let err = db.all(&Statement::new("SELECT * FROM missing")).unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }
}
