//! Listening socket, routing and static file serving.

pub mod listener;
pub mod router;
pub mod static_files;

pub use router::{Handler, Router, RouterBuilder};
pub use static_files::StaticFiles;
