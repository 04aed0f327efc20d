//! MIME type detection module
//!
//! Maps a static asset's extension to its Content-Type. Only the front-end's
//! own asset kinds are recognised; everything else is served as plain text.

/// Get MIME Content-Type based on file extension
///
/// # Examples
/// ```
/// use pricelog::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("html")), "text/html; charset=utf-8");
/// assert_eq!(get_content_type(Some("js")), "application/javascript");
/// assert_eq!(get_content_type(None), "text/plain");
/// ```
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        _ => "text/plain",
    }
}
