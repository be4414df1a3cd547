//! Hand-written HTTP/1.1 for a single connection.
//!
//! Requests are decoded from a byte buffer without any HTTP library, passed to
//! the router, and the response is encoded straight back onto the socket.
//!
//! - [`parser`] turns buffered bytes into a [`request::Request`], or says it needs more
//! - [`writer`] turns a [`response::Response`] into wire bytes
//! - [`headers`] keeps header order while looking names up case-insensitively
//! - [`connection`] owns the socket and loops until keep-alive ends
//! - [`mime`] and [`cache`] support static file responses
//!
//! A connection moves through these states:
//!
//! ```text
//! AwaitingRequest ──▶ Dispatching ──▶ Writing ──keep-alive──▶ AwaitingRequest
//!        │                               │
//!        │ EOF, idle timeout, 400        │ close (500 after a handler panic)
//!        ▼                               ▼
//!      Closed ◀──────────────────────────┘
//! ```
//!
//! Serving a static directory on one socket by hand:
//!
//! ```ignore
//! use std::sync::Arc;
//! use lantern::http::connection::{Connection, ConnectionSettings};
//! use lantern::server::{Router, StaticFiles};
//!
//! let router = Arc::new(Router::builder().build(StaticFiles::new("web")?));
//! let (socket, _) = listener.accept().await?;
//! Connection::new(socket, router, ConnectionSettings::default()).run().await?;
//! ```

pub mod cache;
pub mod connection;
pub mod headers;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
