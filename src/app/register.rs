use std::sync::Arc;

use serde_json::json;

use crate::app::{Credentials, json_response, users::UserStore};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::server::router::Handler;

/// `POST /register` with a JSON body `{"username": .., "password": ..}`.
pub struct RegisterHandler {
    store: Arc<dyn UserStore>,
}

impl RegisterHandler {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }
}

impl Handler for RegisterHandler {
    fn handle(&self, request: &Request) -> Response {
        let Some((username, password)) = Credentials::from_body(&request.body).complete() else {
            return json_response(
                StatusCode::BadRequest,
                json!({"status": "error", "message": "missing username or password field"}),
            );
        };

        match self.store.register(&username, &password) {
            Ok(()) => {
                tracing::info!(%username, "User registered");
                json_response(
                    StatusCode::Ok,
                    json!({"status": "ok", "message": "registered"}),
                )
            }
            Err(e) => {
                tracing::info!(%username, reason = %e, "Registration rejected");
                json_response(
                    StatusCode::BadRequest,
                    json!({"status": "error", "message": e.to_string()}),
                )
            }
        }
    }
}
