//! Content-Type lookup by file extension.

use std::path::Path;

/// Fallback for unknown or missing extensions.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Returns the Content-Type for a file extension (without the dot).
///
/// Matching ignores case.
///
/// # Examples
/// ```
/// use lantern::http::mime::content_type_for_extension;
/// assert_eq!(content_type_for_extension(Some("html")), "text/html");
/// assert_eq!(content_type_for_extension(Some("JPG")), "image/jpeg");
/// assert_eq!(content_type_for_extension(None), "application/octet-stream");
/// ```
pub fn content_type_for_extension(extension: Option<&str>) -> &'static str {
    let Some(ext) = extension else {
        return DEFAULT_CONTENT_TYPE;
    };

    match ext.to_ascii_lowercase().as_str() {
        // Text
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        "css" => "text/css",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "xml" => "application/xml",

        // Scripts and data
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",

        // Audio / video
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",

        // Documents and archives
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",

        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// Returns the Content-Type for a file path based on its extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    content_type_for_extension(path.extension().and_then(|e| e.to_str()))
}
