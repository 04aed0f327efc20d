// API response utility functions module

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::types::ErrorBody;
use crate::error::ApiError;
use crate::http::cache::CachePolicy;
use crate::http::response::CORS_ALLOW_ORIGIN;
use crate::logger;

/// Build JSON response with the CORS origin header
pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    cache: Option<CachePolicy>,
) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", CORS_ALLOW_ORIGIN)
                .body(Full::new(Bytes::from(
                    r#"{"error":"Internal server error","message":"serialization failed"}"#,
                )))
                .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Error"))));
        }
    };

    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", CORS_ALLOW_ORIGIN);
    if let Some(policy) = cache {
        builder = builder.header("Cache-Control", policy.to_header_value());
    }

    builder
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            Response::new(Full::new(Bytes::from("Error")))
        })
}

/// Convert a handler failure into its JSON error response
///
/// `context` names the failed operation, e.g. "Failed to log entry".
pub fn error_response(err: &ApiError, context: &str, expose_details: bool) -> Response<Full<Bytes>> {
    let error = match err {
        ApiError::MissingTable(_) => "Table does not exist",
        ApiError::InvalidFilter(_) => "Invalid filter",
        ApiError::BodyTooLarge(_) => "Payload Too Large",
        ApiError::InvalidBody(_) | ApiError::Store(_) => context,
    };
    let body = ErrorBody {
        error: error.to_string(),
        message: err.to_string(),
        details: expose_details.then(|| format!("{err:?}")),
    };
    json_response(err.status(), &body, None)
}

/// 404 for unknown `/api/*` routes
pub fn not_found() -> Response<Full<Bytes>> {
    crate::http::build_404_response()
}
