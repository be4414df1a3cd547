//! Lantern - HTTP/1.1 server engine
//!
//! Core library: wire codec, keep-alive connections, routing and static
//! file serving, plus the account and upload handlers built on top.

pub mod app;
pub mod config;
pub mod http;
pub mod server;
