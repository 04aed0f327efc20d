//! Request handler module
//!
//! Responsible for request routing dispatch: the `/api/` endpoints, health
//! probes, and static asset fallback.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
