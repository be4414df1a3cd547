//! Raw-body file upload.
//!
//! The request body is stored as-is under the upload directory. The file
//! extension is guessed from magic bytes first, then the `Content-Type`
//! header, then a printable-text heuristic.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;

use crate::app::json_response;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::server::router::Handler;

const TEXT_SAMPLE_LEN: usize = 1024;

pub struct UploadHandler {
    dir: PathBuf,
}

impl UploadHandler {
    /// Creates the upload directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `body` to a fresh `uploaded_<millis><ext>` file and returns its name.
    fn store(&self, body: &[u8], extension: &str) -> io::Result<String> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        let mut attempt = 0u32;
        loop {
            let filename = if attempt == 0 {
                format!("uploaded_{millis}{extension}")
            } else {
                format!("uploaded_{millis}_{attempt}{extension}")
            };

            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.dir.join(&filename))
            {
                Ok(mut file) => {
                    file.write_all(body)?;
                    return Ok(filename);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e),
            }
        }
    }
}

impl Handler for UploadHandler {
    fn handle(&self, request: &Request) -> Response {
        if request.body.is_empty() {
            return json_response(
                StatusCode::BadRequest,
                json!({"status": "error", "message": "No file data received"}),
            );
        }

        let extension = detect_extension(&request.body, request.header("Content-Type"));

        match self.store(&request.body, extension) {
            Ok(filename) => {
                tracing::info!(%filename, size = request.body.len(), "File uploaded");
                json_response(
                    StatusCode::Ok,
                    json!({
                        "status": "success",
                        "message": "File uploaded successfully",
                        "filename": filename,
                        "size": request.body.len(),
                    }),
                )
            }
            Err(e) => {
                tracing::error!(dir = %self.dir.display(), error = %e, "Failed to save upload");
                json_response(
                    StatusCode::InternalServerError,
                    json!({"status": "error", "message": format!("Failed to save uploaded file: {e}")}),
                )
            }
        }
    }
}

/// Picks a file extension (with the dot) for an uploaded body.
pub fn detect_extension(body: &[u8], content_type: Option<&str>) -> &'static str {
    if body.len() >= 4 {
        if body.starts_with(&[0xFF, 0xD8]) {
            return ".jpg";
        }
        if body.starts_with(&[0x89, b'P', b'N', b'G']) {
            return ".png";
        }
    }

    if let Some(ct) = content_type {
        if ct.contains("image/jpeg") || ct.contains("image/jpg") {
            return ".jpg";
        }
        if ct.contains("image/png") {
            return ".png";
        }
    }

    if looks_like_text(body) { ".txt" } else { ".bin" }
}

/// More than 80% printable ASCII, whitespace or non-ASCII (UTF-8) bytes in the first KiB.
fn looks_like_text(body: &[u8]) -> bool {
    let sample = &body[..body.len().min(TEXT_SAMPLE_LEN)];
    if sample.is_empty() {
        return true;
    }

    let texty = sample
        .iter()
        .filter(|&&b| matches!(b, 32..=126 | b'\t' | b'\n' | b'\r') || b >= 0x80)
        .count();

    texty * 5 > sample.len() * 4
}
