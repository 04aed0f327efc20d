//! Static file serving module
//!
//! Resolves non-API paths against the asset directory and builds the
//! responses, with `ETag` revalidation.

use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Directory-backed asset lookup
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
    index_file: String,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>, index_file: &str) -> Self {
        Self {
            root: root.into(),
            index_file: index_file.to_string(),
        }
    }

    /// Lookup key for a request path
    ///
    /// The leading `/` is stripped; `/` and the empty path map to the index
    /// file.
    pub fn key_for(&self, path: &str) -> String {
        match path.trim_start_matches('/') {
            "" => self.index_file.clone(),
            key => key.to_string(),
        }
    }

    /// Fetch the raw bytes stored under `key`
    ///
    /// Returns `Ok(None)` when the key is absent or resolves outside the
    /// asset root.
    pub async fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        let root = match fs::canonicalize(&self.root).await {
            Ok(p) => p,
            Err(e) => {
                logger::log_warning(&format!(
                    "Static directory not found or inaccessible '{}': {e}",
                    self.root.display()
                ));
                return Ok(None);
            }
        };

        // File not found is common (404), no need to log at warning level
        let Ok(file_path) = fs::canonicalize(root.join(key)).await else {
            return Ok(None);
        };
        if !file_path.starts_with(&root) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {key} -> {}",
                file_path.display()
            ));
            return Ok(None);
        }
        if !fs::metadata(&file_path).await?.is_file() {
            return Ok(None);
        }

        fs::read(&file_path).await.map(Some)
    }
}

/// Serve the asset addressed by the request path
pub async fn serve_asset(ctx: &RequestContext<'_>, store: &AssetStore) -> Response<Full<Bytes>> {
    let key = store.key_for(ctx.path);

    match store.get(&key).await {
        Ok(Some(content)) => {
            let content_type =
                mime::get_content_type(Path::new(&key).extension().and_then(|e| e.to_str()));
            build_static_file_response(
                content,
                content_type,
                ctx.if_none_match.as_deref(),
                ctx.is_head,
            )
        }
        Ok(None) => {
            logger::log_warning(&format!("Static file not found: {key}"));
            http::build_asset_404_response(&key)
        }
        Err(e) => {
            logger::log_error(&format!("Error serving static file '{key}': {e}"));
            http::build_500_response(&e.to_string())
        }
    }
}

/// Build static file response with `ETag` support
fn build_static_file_response(
    data: Vec<u8>,
    content_type: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&data);

    // Check if client has cached version
    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    http::build_asset_response(Bytes::from(data), content_type, &etag, is_head)
}
