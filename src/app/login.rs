use std::sync::Arc;

use crate::app::{Credentials, users::UserStore};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::server::router::Handler;

/// `POST /login` with a JSON body `{"username": .., "password": ..}`.
///
/// Missing fields and bad credentials both answer 404, which is what existing
/// clients of this endpoint expect.
pub struct LoginHandler {
    store: Arc<dyn UserStore>,
}

impl LoginHandler {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }
}

impl Handler for LoginHandler {
    fn handle(&self, request: &Request) -> Response {
        let Some((username, password)) = Credentials::from_body(&request.body).complete() else {
            return plain(StatusCode::NotFound, "Missing username or password.");
        };

        if self.store.login(&username, &password) {
            tracing::info!(%username, "Login succeeded");
            plain(StatusCode::Ok, "Login successful!")
        } else {
            tracing::info!(%username, "Login rejected");
            plain(StatusCode::NotFound, "Invalid credentials.")
        }
    }
}

fn plain(status: StatusCode, body: &str) -> Response {
    let mut response = Response::text(status, body);
    response
        .headers
        .insert("Content-Type", "text/plain; charset=UTF-8");
    response
}
