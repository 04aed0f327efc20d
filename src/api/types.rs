// API types module
// Request and response bodies of the entry and summary endpoints

use serde::{Deserialize, Serialize};

use crate::store::Row;

/// Body of `POST /api/log-entry`
#[derive(Debug, Clone, Deserialize)]
pub struct NewEntry {
    pub entry_type: String,
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Echo of the applied range, plus whether any predicate was used
#[derive(Debug, Serialize)]
pub struct SummaryMeta {
    pub filtered: bool,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub meta: SummaryMeta,
    pub results: Vec<Row>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
