// API module entry
// Entry submission and summary endpoints under /api/

mod handlers;
mod response;
mod types;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::sync::Arc;

use crate::config::AppState;
use crate::error::BoxError;
use crate::logger;
use crate::query::SummaryKind;

pub use response::{error_response, json_response};
pub use types::{NewEntry, SummaryMeta, SummaryResponse};

pub const API_PREFIX: &str = "/api/";

/// API route handler
///
/// Dispatches to handler functions based on request path and method
pub async fn handle_api<B>(req: Request<B>, state: &Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);

    let summary_kind = match path.as_str() {
        "/api/summary" => Some(SummaryKind::ByType),
        "/api/daily-summary" => Some(SummaryKind::Daily),
        "/api/weekly-summary" => Some(SummaryKind::Weekly),
        "/api/monthly-summary" => Some(SummaryKind::Monthly),
        _ => None,
    };

    let response = match (&method, path.as_str(), summary_kind) {
        (&Method::POST, "/api/log-entry", _) => handlers::handle_log_entry(req, state).await,
        (&Method::GET, _, Some(kind)) => {
            handlers::handle_summary(query.as_deref(), state, kind).await
        }
        // Unknown route
        _ => response::not_found(),
    };

    logger::log_api_request(method.as_str(), &path, response.status().as_u16());
    response
}
