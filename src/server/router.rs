//! Request routing.
//!
//! Rules are checked in the order they were added and the first match wins.
//! Paths are compared exactly (no wildcards) against the request path with its
//! query string removed. Unmatched GET/HEAD requests fall through to the
//! static file resolver; any other unmatched method gets 405.

use std::sync::Arc;

use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::server::static_files::StaticFiles;

/// Anything that turns a decoded request into a response.
///
/// Handlers run on a blocking thread pool and may be called concurrently from
/// different connections.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &Request) -> Response;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> Response + Send + Sync,
{
    fn handle(&self, request: &Request) -> Response {
        self(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodMatcher {
    Any,
    Exact(Method),
}

impl MethodMatcher {
    pub fn matches(&self, method: &Method) -> bool {
        match self {
            MethodMatcher::Any => true,
            MethodMatcher::Exact(m) => m == method,
        }
    }
}

pub enum RouteAction {
    Handler(Arc<dyn Handler>),
    Redirect { location: String, status: StatusCode },
}

pub struct RouteEntry {
    pub method: MethodMatcher,
    pub path: String,
    pub action: RouteAction,
}

impl RouteEntry {
    pub fn matches(&self, request: &Request) -> bool {
        self.method.matches(&request.method) && self.path == request.path()
    }
}

pub struct Router {
    routes: Vec<RouteEntry>,
    fallback: StaticFiles,
}

#[derive(Default)]
pub struct RouterBuilder {
    routes: Vec<RouteEntry>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, method: Method, path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.route_arc(method, path, Arc::new(handler))
    }

    /// Registers a handler that is shared with other routes.
    pub fn route_arc(mut self, method: Method, path: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        self.routes.push(RouteEntry {
            method: MethodMatcher::Exact(method),
            path: path.into(),
            action: RouteAction::Handler(handler),
        });
        self
    }

    /// Adds a fixed redirect. Redirects match every method.
    pub fn redirect(mut self, from: impl Into<String>, to: impl Into<String>, status: StatusCode) -> Self {
        debug_assert!(status.is_redirect(), "redirect status must be 301 or 302");
        self.routes.push(RouteEntry {
            method: MethodMatcher::Any,
            path: from.into(),
            action: RouteAction::Redirect {
                location: to.into(),
                status,
            },
        });
        self
    }

    pub fn build(self, fallback: StaticFiles) -> Router {
        Router {
            routes: self.routes,
            fallback,
        }
    }
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn static_files(&self) -> &StaticFiles {
        &self.fallback
    }

    pub fn route(&self, request: &Request) -> Response {
        if let Some(entry) = self.routes.iter().find(|r| r.matches(request)) {
            return match &entry.action {
                RouteAction::Handler(handler) => handler.handle(request),
                RouteAction::Redirect { location, status } => {
                    tracing::debug!(from = %entry.path, to = %location, "Redirecting");
                    Response::redirect(location, *status)
                }
            };
        }

        match request.method {
            Method::GET | Method::HEAD => self.fallback.serve(request),
            _ => Response::method_not_allowed(),
        }
    }
}
