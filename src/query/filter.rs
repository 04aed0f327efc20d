//! Summary filter parsing and predicate construction

use std::borrow::Cow;

use super::statement::BindValue;

/// Optional filters recognised by the summary endpoints
///
/// Each field is `None` when the query string omits it or passes an empty
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryFilter {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub date: Option<String>,
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub week: Option<i64>,
    pub day: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("invalid value '{value}' for '{field}': expected an integer")]
    InvalidInteger { field: &'static str, value: String },
}

impl SummaryFilter {
    /// Parse filters from a raw (still percent-encoded) query string
    ///
    /// Unknown keys are ignored and the first occurrence of a key wins.
    /// Integer fields that do not parse are rejected rather than dropped.
    pub fn from_query(query: Option<&str>) -> Result<Self, FilterError> {
        let mut filter = Self::default();
        for (key, value) in pairs(query) {
            match key.as_ref() {
                "start_date" => set_once(&mut filter.start_date, value.into_owned()),
                "end_date" => set_once(&mut filter.end_date, value.into_owned()),
                "date" => set_once(&mut filter.date, value.into_owned()),
                "year" => set_once(&mut filter.year, parse_int("year", &value)?),
                "month" => set_once(&mut filter.month, parse_int("month", &value)?),
                "week" => set_once(&mut filter.week, parse_int("week", &value)?),
                "day" => set_once(&mut filter.day, parse_int("day", &value)?),
                _ => {}
            }
        }
        Ok(filter)
    }

    /// Parse only `start_date`/`end_date`; every other key is ignored
    /// without validation.
    pub fn range_from_query(query: Option<&str>) -> Self {
        let mut filter = Self::default();
        for (key, value) in pairs(query) {
            match key.as_ref() {
                "start_date" => set_once(&mut filter.start_date, value.into_owned()),
                "end_date" => set_once(&mut filter.end_date, value.into_owned()),
                _ => {}
            }
        }
        filter
    }

    /// Copy keeping only the `start_date`/`end_date` range
    #[must_use]
    pub fn date_range(&self) -> Self {
        Self {
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            ..Self::default()
        }
    }
}

/// Decoded key/value pairs with empty values skipped
fn pairs(query: Option<&str>) -> impl Iterator<Item = (Cow<'_, str>, Cow<'_, str>)> {
    query
        .map(|q| form_urlencoded::parse(q.as_bytes()))
        .into_iter()
        .flatten()
        .filter(|(_, value)| !value.is_empty())
}

fn set_once<T>(slot: &mut Option<T>, value: T) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

fn parse_int(field: &'static str, value: &str) -> Result<i64, FilterError> {
    value
        .trim()
        .parse()
        .map_err(|_| FilterError::InvalidInteger {
            field,
            value: value.to_string(),
        })
}

/// Ordered predicates with their positionally aligned bind values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterClause {
    pub predicates: Vec<&'static str>,
    pub binds: Vec<BindValue>,
}

impl FilterClause {
    fn push(&mut self, predicate: &'static str, value: BindValue) {
        self.predicates.push(predicate);
        self.binds.push(value);
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// ` WHERE a AND b`, or an empty string when unfiltered
    pub fn where_sql(&self) -> String {
        if self.predicates.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.predicates.join(" AND "))
        }
    }
}

/// Build the predicate/bind-value pair for `filter`
///
/// The order is fixed: start_date, end_date, date, year, month, week, day.
pub fn build_filters(filter: &SummaryFilter) -> FilterClause {
    let mut clause = FilterClause::default();

    if let Some(start) = &filter.start_date {
        clause.push("entry_date >= ?", BindValue::Text(start.clone()));
    }
    if let Some(end) = &filter.end_date {
        clause.push("entry_date <= ?", BindValue::Text(end.clone()));
    }
    if let Some(date) = &filter.date {
        clause.push("entry_date = ?", BindValue::Text(date.clone()));
    }
    if let Some(year) = filter.year {
        clause.push("year = ?", BindValue::Integer(year));
    }
    if let Some(month) = filter.month {
        clause.push("month = ?", BindValue::Integer(month));
    }
    if let Some(week) = filter.week {
        clause.push("week = ?", BindValue::Integer(week));
    }
    if let Some(day) = filter.day {
        clause.push("day = ?", BindValue::Integer(day));
    }

    clause
}
