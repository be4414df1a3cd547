//! Static file serving beneath a fixed root.
//!
//! Only GET and HEAD are served. Request targets are confined to the root two
//! ways: any `..` segment is refused outright, and the canonicalized path must
//! still start with the canonicalized root. Both failures answer 404.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{error, warn};

use crate::http::cache;
use crate::http::mime;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};

const INDEX_FILE: &str = "/index.html";
const NOT_FOUND_PAGE: &str = "404.html";

/// Facts about a file that is about to be served.
#[derive(Debug, Clone)]
pub struct ResourceMetadata {
    pub path: PathBuf,
    /// Modification time truncated to whole seconds
    pub last_modified: SystemTime,
    pub content_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

/// Strips the query string and fragment; an empty path or `/` becomes `/index.html`.
pub fn normalize_target(target: &str) -> &str {
    let path = target
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    if path.is_empty() || path == "/" {
        INDEX_FILE
    } else {
        path
    }
}

/// True if any segment of the path is `..`.
pub fn has_parent_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| segment == "..")
}

impl StaticFiles {
    /// Serves files beneath `root`, which must exist.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref().canonicalize()?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a request target onto a regular file beneath the root.
    ///
    /// Returns `None` for traversal attempts and for paths that do not exist.
    pub fn resolve(&self, target: &str) -> Option<PathBuf> {
        let path = normalize_target(target);

        if has_parent_segment(path) {
            warn!(uri = target, "Path traversal attempt blocked");
            return None;
        }

        let relative = path.trim_start_matches(['/', '\\']);
        let canonical = self.root.join(relative).canonicalize().ok()?;

        if !canonical.starts_with(&self.root) {
            warn!(
                uri = target,
                resolved = %canonical.display(),
                "Resolved path escapes the static root"
            );
            return None;
        }

        Some(canonical)
    }

    /// Reads metadata fresh from the filesystem. `Ok(None)` if `path` is not a regular file.
    pub fn metadata(&self, path: &Path) -> io::Result<Option<ResourceMetadata>> {
        let meta = fs::metadata(path)?;
        if !meta.is_file() {
            return Ok(None);
        }

        Ok(Some(ResourceMetadata {
            path: path.to_path_buf(),
            last_modified: cache::truncate_to_seconds(meta.modified()?),
            content_type: mime::content_type_for_path(path),
        }))
    }

    pub fn serve(&self, request: &Request) -> Response {
        if !matches!(request.method, Method::GET | Method::HEAD) {
            return Response::method_not_allowed();
        }

        let Some(path) = self.resolve(&request.target) else {
            return self.not_found();
        };

        let resource = match self.metadata(&path) {
            Ok(Some(resource)) => resource,
            Ok(None) => return self.not_found(),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to stat file");
                return Response::internal_error();
            }
        };

        let last_modified = cache::format_http_date(resource.last_modified);

        if cache::is_not_modified(
            request.header("If-Modified-Since"),
            resource.last_modified,
        ) {
            return ResponseBuilder::new(StatusCode::NotModified)
                .header("Last-Modified", last_modified)
                .build();
        }

        let content = match fs::read(&resource.path) {
            Ok(content) => content,
            Err(e) => {
                error!(path = %resource.path.display(), error = %e, "Failed to read file");
                return Response::internal_error();
            }
        };

        let response = ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", resource.content_type)
            .header("Last-Modified", last_modified)
            .body(content)
            .build();

        if request.method == Method::HEAD {
            response.without_body()
        } else {
            response
        }
    }

    /// 404 using `<root>/404.html` when it exists, plain text otherwise.
    fn not_found(&self) -> Response {
        let page = self.root.join(NOT_FOUND_PAGE);
        if page.is_file() {
            match fs::read(&page) {
                Ok(body) => {
                    return ResponseBuilder::new(StatusCode::NotFound)
                        .header("Content-Type", "text/html")
                        .body(body)
                        .build();
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read custom 404 page");
                }
            }
        }

        Response::not_found()
    }
}
