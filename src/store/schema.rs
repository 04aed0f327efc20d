//! Entries table bootstrap
//!
//! Idempotent; runs once at startup when `database.create_schema` is set.

use super::{SqliteDatabase, StoreError};

const ENTRIES_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_type TEXT NOT NULL,
    price REAL NOT NULL,
    entry_date TEXT NOT NULL,
    entry_timestamp TEXT NOT NULL,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    week INTEGER NOT NULL,
    day INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(entry_date);
CREATE INDEX IF NOT EXISTS idx_entries_year_week ON entries(year, week);
CREATE INDEX IF NOT EXISTS idx_entries_year_month ON entries(year, month);
";

pub fn init_schema(db: &SqliteDatabase) -> Result<(), StoreError> {
    db.execute_batch(ENTRIES_SCHEMA)
}
