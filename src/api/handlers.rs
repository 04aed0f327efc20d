// Entry and summary handlers module

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

use super::response::{error_response, json_response};
use super::types::{NewEntry, SuccessResponse, SummaryMeta, SummaryResponse};
use crate::config::AppState;
use crate::error::{ApiError, BoxError};
use crate::http::cache::CachePolicy;
use crate::logger;
use crate::partition::partition;
use crate::query::{self, SummaryKind, ENTRIES_TABLE};
use crate::store;

/// `POST /api/log-entry`
pub async fn handle_log_entry<B>(req: Request<B>, state: &Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    match log_entry(req, state).await {
        Ok(()) => json_response(StatusCode::OK, &SuccessResponse { success: true }, None),
        Err(e) => {
            logger::log_error(&format!("Failed to log entry: {e}"));
            error_response(&e, "Failed to log entry", state.config.http.expose_error_details)
        }
    }
}

async fn log_entry<B>(req: Request<B>, state: &Arc<AppState>) -> Result<(), ApiError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    // Content-Length is checked up front; this also caps chunked bodies
    let max_body_size = state.config.http.max_body_size;
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = Limited::new(req.into_body(), limit)
        .collect()
        .await
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                ApiError::BodyTooLarge(max_body_size)
            } else {
                ApiError::InvalidBody(e.to_string())
            }
        })?
        .to_bytes();
    let entry: NewEntry =
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    logger::log_info(&format!(
        "Received log entry: {}",
        String::from_utf8_lossy(&body)
    ));

    // One clock sample per write; every derived column comes from it
    let partition = partition(state.clock.now());
    let statement = query::insert_entry(&entry.entry_type, entry.price, &partition);
    let result = store::blocking(&state.db, move |db| db.run(&statement)).await?;

    logger::log_db(&format!(
        "Entry created: id={} type={} date={} week={}",
        result.last_row_id, entry.entry_type, partition.entry_date, partition.week
    ));
    Ok(())
}

/// `GET /api/summary`, `/api/daily-summary`, `/api/weekly-summary`,
/// `/api/monthly-summary`
pub async fn handle_summary(
    raw_query: Option<&str>,
    state: &Arc<AppState>,
    kind: SummaryKind,
) -> Response<Full<Bytes>> {
    match summary(raw_query, state, kind).await {
        Ok(body) => json_response(StatusCode::OK, &body, Some(CachePolicy::SUMMARY)),
        Err(e) => {
            match &e {
                ApiError::MissingTable(_) => logger::log_warning(&e.to_string()),
                _ => logger::log_error(&format!("Failed to fetch {}: {e}", kind.label())),
            }
            error_response(
                &e,
                &format!("Failed to fetch {}", kind.label()),
                state.config.http.expose_error_details,
            )
        }
    }
}

async fn summary(
    raw_query: Option<&str>,
    state: &Arc<AppState>,
    kind: SummaryKind,
) -> Result<SummaryResponse, ApiError> {
    let filter = kind.parse_filter(raw_query)?;
    ensure_entries_table(state).await?;

    if kind == SummaryKind::ByType {
        let count = store::blocking(&state.db, |db| db.first(&query::count_entries())).await?;
        let total = count
            .as_ref()
            .and_then(|row| row.get("count"))
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(0);
        logger::log_db(&format!("Total entries count: {total}"));
    }

    let clause = kind.filters(&filter);
    let statement = kind.statement(&clause);
    logger::log_db(&format!(
        "{}: {} with {} bind(s)",
        kind.label(),
        statement.sql,
        statement.binds.len()
    ));
    let rows = store::blocking(&state.db, move |db| db.all(&statement)).await?;

    Ok(SummaryResponse {
        success: true,
        meta: SummaryMeta {
            filtered: !clause.is_empty(),
            start_date: filter.start_date,
            end_date: filter.end_date,
        },
        results: rows.results,
    })
}

/// Fail with `MissingTable` when the entries table is absent
///
/// A failing probe is logged and ignored; the aggregate query then reports
/// the real error.
async fn ensure_entries_table(state: &Arc<AppState>) -> Result<(), ApiError> {
    let probe = store::blocking(&state.db, |db| {
        db.first(&query::table_exists(ENTRIES_TABLE))
    })
    .await;

    match probe {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(ApiError::MissingTable(ENTRIES_TABLE)),
        Err(e) => {
            logger::log_warning(&format!("Error checking table existence: {e}"));
            Ok(())
        }
    }
}
