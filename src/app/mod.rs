//! Application handlers wired on top of the HTTP engine.
//!
//! These talk to the core only through [`Handler`]; storage is injected when
//! the router is built.

pub mod login;
pub mod register;
pub mod upload;
pub mod users;

use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;

use crate::config::Config;
use crate::http::request::Method;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::server::router::{Handler, Router};
use crate::server::static_files::StaticFiles;

pub use login::LoginHandler;
pub use register::RegisterHandler;
pub use upload::UploadHandler;
pub use users::{InMemoryUserStore, RegisterError, UserStore};

/// `{"username": .., "password": ..}` request body. Fields may be missing.
#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// Parses a JSON body; anything unparseable counts as empty.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    pub fn complete(self) -> Option<(String, String)> {
        Some((self.username?, self.password?))
    }
}

pub fn json_response(status: StatusCode, value: serde_json::Value) -> Response {
    ResponseBuilder::new(status)
        .header("Content-Type", "application/json; charset=utf-8")
        .body(value.to_string().into_bytes())
        .build()
}

/// Builds the server's routing table from config, with `store` backing the
/// account endpoints.
pub fn build_router(cfg: &Config, store: Arc<dyn UserStore>) -> anyhow::Result<Router> {
    let static_files = StaticFiles::new(&cfg.static_files.root).with_context(|| {
        format!(
            "static root {} is not accessible",
            cfg.static_files.root.display()
        )
    })?;

    let login: Arc<dyn Handler> = Arc::new(LoginHandler::new(Arc::clone(&store)));
    let register: Arc<dyn Handler> = Arc::new(RegisterHandler::new(store));
    let upload: Arc<dyn Handler> = Arc::new(
        UploadHandler::new(&cfg.app.upload_dir).with_context(|| {
            format!(
                "cannot create upload directory {}",
                cfg.app.upload_dir.display()
            )
        })?,
    );

    let mut builder = Router::builder();
    for redirect in &cfg.redirects {
        builder = builder.redirect(
            redirect.from.as_str(),
            redirect.to.as_str(),
            StatusCode::from_u16(redirect.status),
        );
    }

    let router = builder
        .route_arc(Method::POST, "/login", Arc::clone(&login))
        .route_arc(Method::POST, "/api/login", login)
        .route_arc(Method::POST, "/register", Arc::clone(&register))
        .route_arc(Method::POST, "/api/register", register)
        .route_arc(Method::POST, "/upload", Arc::clone(&upload))
        .route_arc(Method::POST, "/api/upload", upload)
        .build(static_files);

    tracing::info!(
        routes = router.routes().len(),
        root = %router.static_files().root().display(),
        "Router ready"
    );

    Ok(router)
}
