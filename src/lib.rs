//! pricelog: a small HTTP service that records priced entries and reports
//! aggregate summaries over them, backed by SQLite.

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod partition;
pub mod query;
pub mod server;
pub mod store;
