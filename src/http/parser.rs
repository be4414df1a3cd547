use crate::http::headers::Headers;
use crate::http::request::{Method, Request};

/// Default upper bound for the request line plus headers.
pub const DEFAULT_MAX_HEADER_BYTES: usize = 8 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed request line")]
    MalformedRequestLine,
    #[error("request head larger than {limit} bytes")]
    HeaderTooLarge { limit: usize },
    #[error("invalid Content-Length header")]
    InvalidContentLength,
    #[error("request body larger than {limit} bytes")]
    BodyTooLarge { limit: usize },
    #[error("request body incomplete: got {received} of {expected} bytes")]
    IncompleteBody { expected: usize, received: usize },
    #[error("request incomplete, more data needed")]
    Incomplete,
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses a complete request (head and body) out of `buf`.
///
/// Returns the request and the number of bytes it occupied, or
/// [`ParseError::Incomplete`] if `buf` does not yet hold the whole request.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    parse_http_request_with_limit(buf, DEFAULT_MAX_HEADER_BYTES)
}

pub fn parse_http_request_with_limit(
    buf: &[u8],
    max_header_bytes: usize,
) -> Result<(Request, usize), ParseError> {
    let (mut request, head_len) = parse_request_head(buf, max_header_bytes)?;
    let content_length = declared_body_length(&request)?;

    let body_bytes = &buf[head_len..];
    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }

    request.body = body_bytes[..content_length].to_vec();
    Ok((request, head_len + content_length))
}

/// Parses the request line and headers.
///
/// The returned request has an empty body; the `usize` is the number of bytes
/// consumed up to and including the blank line that ends the head. Leading
/// empty lines left over from a previous request are skipped, but still count
/// towards `max_header_bytes`.
pub fn parse_request_head(
    buf: &[u8],
    max_header_bytes: usize,
) -> Result<(Request, usize), ParseError> {
    let skipped = buf
        .iter()
        .take_while(|b| **b == b'\r' || **b == b'\n')
        .count();
    let buf = &buf[skipped..];

    let Some((headers_end, terminator_len)) = find_headers_end(buf) else {
        if skipped + buf.len() > max_header_bytes {
            return Err(ParseError::HeaderTooLarge {
                limit: max_header_bytes,
            });
        }
        return Err(ParseError::Incomplete);
    };

    if skipped + headers_end + terminator_len > max_header_bytes {
        return Err(ParseError::HeaderTooLarge {
            limit: max_header_bytes,
        });
    }

    let headers_str = std::str::from_utf8(&buf[..headers_end])
        .map_err(|_| ParseError::MalformedRequestLine)?;

    let mut lines = headers_str.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));

    // Request line
    let request_line = lines.next().ok_or(ParseError::MalformedRequestLine)?;
    let (method, target, version) = parse_request_line(request_line)?;

    // Headers
    let mut headers = Headers::new();
    for line in lines {
        let Some((name, value)) = line.split_once(": ") else {
            tracing::debug!(line, "Skipping malformed header line");
            continue;
        };

        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            tracing::debug!(line, "Skipping malformed header line");
            continue;
        }

        headers.insert(name, value.trim());
    }

    let request = Request {
        method,
        target: target.to_string(),
        version: version.to_string(),
        headers,
        body: Vec::new(),
    };

    // Reject a bad Content-Length before anyone waits for the body
    declared_body_length(&request)?;

    Ok((request, skipped + headers_end + terminator_len))
}

/// Number of body bytes announced by the request's `Content-Length` header.
///
/// A missing header means an empty body; chunked encoding is not supported.
pub fn declared_body_length(request: &Request) -> Result<usize, ParseError> {
    match request.header("Content-Length") {
        None => Ok(0),
        Some(v) => {
            let v = v.trim();
            if v.is_empty() || !v.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseError::InvalidContentLength);
            }
            v.parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength)
        }
    }
}

fn parse_request_line(line: &str) -> Result<(Method, &str, &str), ParseError> {
    let parts: Vec<&str> = line.split(' ').collect();

    let [method_str, target, version] = parts.as_slice() else {
        return Err(ParseError::MalformedRequestLine);
    };

    if target.is_empty() || !matches!(*version, "HTTP/1.0" | "HTTP/1.1") {
        return Err(ParseError::MalformedRequestLine);
    }

    let method = Method::parse(method_str).ok_or(ParseError::MalformedRequestLine)?;
    Ok((method, *target, *version))
}

/// Finds the end of the head: the first `\r\n\r\n` or `\n\n`.
///
/// Returns the offset where the terminator starts and its length.
pub fn find_headers_end(buf: &[u8]) -> Option<(usize, usize)> {
    (0..buf.len()).find_map(|i| {
        let rest = &buf[i..];
        if rest.starts_with(b"\r\n\r\n") {
            Some((i, 4))
        } else if rest.starts_with(b"\n\n") {
            Some((i, 2))
        } else {
            None
        }
    })
}
