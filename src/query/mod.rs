//! Query construction module
//!
//! Pure construction of the parameterized statements run against the
//! entries table. Values are never spliced into SQL text; they travel as an
//! ordered bind list next to the `?` placeholders.

mod filter;
mod statement;

pub use filter::{build_filters, FilterClause, FilterError, SummaryFilter};
pub use statement::{
    count_entries, insert_entry, table_exists, BindValue, Statement, SummaryKind, ENTRIES_TABLE,
};
