//! Request-boundary error taxonomy

use hyper::StatusCode;

use crate::query::FilterError;
use crate::store::StoreError;

/// Error type request bodies are converted into
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, unreadable or non-JSON write body
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Body grew past `http.max_body_size` while being read
    #[error("request body exceeds {0} bytes")]
    BodyTooLarge(u64),

    #[error(transparent)]
    InvalidFilter(#[from] FilterError),

    #[error("The {0} table has not been created yet")]
    MissingTable(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            Self::MissingTable(_) => StatusCode::NOT_FOUND,
            // A malformed write body is reported like any other write failure
            Self::InvalidBody(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
