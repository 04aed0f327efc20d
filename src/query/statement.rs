//! Parameterized statements and the aggregate query templates

use super::filter::{build_filters, FilterClause, FilterError, SummaryFilter};
use crate::partition::Partition;

pub const ENTRIES_TABLE: &str = "entries";

/// A literal bound to one `?` placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

/// SQL text plus its bind values, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            binds: Vec::new(),
        }
    }

    #[must_use]
    pub fn bind(mut self, value: BindValue) -> Self {
        self.binds.push(value);
        self
    }
}

/// The four aggregate views over `entries`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    ByType,
    Daily,
    Weekly,
    Monthly,
}

impl SummaryKind {
    fn select(self) -> &'static str {
        match self {
            Self::ByType => {
                "SELECT entry_type, COUNT(*) AS count, SUM(price) AS total_value, AVG(price) AS average_price FROM entries"
            }
            Self::Daily => {
                "SELECT entry_date, SUM(price) AS daily_total, COUNT(*) AS entry_count FROM entries"
            }
            Self::Weekly => {
                "SELECT year, week, SUM(price) AS weekly_total, COUNT(*) AS entry_count FROM entries"
            }
            Self::Monthly => {
                "SELECT year, month, SUM(price) AS monthly_total, COUNT(*) AS entry_count FROM entries"
            }
        }
    }

    fn grouping(self) -> &'static str {
        match self {
            Self::ByType => " GROUP BY entry_type",
            Self::Daily => " GROUP BY entry_date ORDER BY entry_date DESC",
            Self::Weekly => " GROUP BY year, week ORDER BY year DESC, week DESC",
            Self::Monthly => " GROUP BY year, month ORDER BY year DESC, month DESC",
        }
    }

    /// Label used in log lines and error payloads
    pub const fn label(self) -> &'static str {
        match self {
            Self::ByType => "summary",
            Self::Daily => "daily summary",
            Self::Weekly => "weekly summary",
            Self::Monthly => "monthly summary",
        }
    }

    /// Read the query parameters this view accepts
    ///
    /// The date-range views never look at the calendar keys, so malformed
    /// values there cannot fail the request.
    pub fn parse_filter(self, query: Option<&str>) -> Result<SummaryFilter, FilterError> {
        match self {
            Self::ByType => SummaryFilter::from_query(query),
            Self::Daily | Self::Weekly | Self::Monthly => {
                Ok(SummaryFilter::range_from_query(query))
            }
        }
    }

    /// Predicates this view honours; only the by-type view uses the
    /// calendar fields, the others take the date range alone.
    pub fn filters(self, filter: &SummaryFilter) -> FilterClause {
        match self {
            Self::ByType => build_filters(filter),
            Self::Daily | Self::Weekly | Self::Monthly => build_filters(&filter.date_range()),
        }
    }

    /// Compose the final statement from a filter clause
    pub fn statement(self, clause: &FilterClause) -> Statement {
        Statement {
            sql: format!("{}{}{}", self.select(), clause.where_sql(), self.grouping()),
            binds: clause.binds.clone(),
        }
    }
}

pub fn insert_entry(entry_type: &str, price: f64, partition: &Partition) -> Statement {
    Statement::new(
        "INSERT INTO entries (entry_type, price, entry_date, entry_timestamp, year, month, week, day) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(BindValue::Text(entry_type.to_string()))
    .bind(BindValue::Real(price))
    .bind(BindValue::Text(partition.entry_date.clone()))
    .bind(BindValue::Text(partition.entry_timestamp.clone()))
    .bind(BindValue::Integer(i64::from(partition.year)))
    .bind(BindValue::Integer(i64::from(partition.month)))
    .bind(BindValue::Integer(i64::from(partition.week)))
    .bind(BindValue::Integer(i64::from(partition.day)))
}

pub fn count_entries() -> Statement {
    Statement::new("SELECT COUNT(*) AS count FROM entries")
}

pub fn table_exists(table: &str) -> Statement {
    Statement::new("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
        .bind(BindValue::Text(table.to_string()))
}
