//! Relational store boundary
//!
//! Handlers only see the [`Database`] trait: `run` for writes, `all` and
//! `first` for reads, each taking a parameterized [`Statement`]. The SQLite
//! implementation lives in [`sqlite`].

mod schema;
mod sqlite;

use std::sync::Arc;

use crate::query::Statement;

pub use schema::init_schema;
pub use sqlite::SqliteDatabase;

/// One result row, keyed by column name
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Outcome of a write statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    pub changes: usize,
    pub last_row_id: i64,
}

/// Rows returned by a read statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResults {
    pub results: Vec<Row>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("database connection lock poisoned")]
    Poisoned,
    #[error("database task failed: {0}")]
    Task(String),
}

pub trait Database: Send + Sync {
    fn run(&self, statement: &Statement) -> Result<RunResult, StoreError>;

    fn all(&self, statement: &Statement) -> Result<QueryResults, StoreError>;

    fn first(&self, statement: &Statement) -> Result<Option<Row>, StoreError>;

    /// Cheap round trip used by the readiness probe
    fn ping(&self) -> Result<(), StoreError> {
        self.first(&Statement::new("SELECT 1")).map(|_| ())
    }
}

pub type SharedDatabase = Arc<dyn Database>;

/// Run a store call on the blocking pool
pub async fn blocking<T, F>(db: &SharedDatabase, f: F) -> Result<T, StoreError>
where
    F: FnOnce(&dyn Database) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let db = Arc::clone(db);
    tokio::task::spawn_blocking(move || f(db.as_ref()))
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
}
