use std::sync::Arc;

use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::router::matcher::{self, Params};

/// Produces the response for a matched route.
pub trait Handler: Send + Sync {
    fn handle(&self, req: &mut Request, res: &mut Response);
}

impl<F> Handler for F
where
    F: Fn(&mut Request, &mut Response) + Send + Sync,
{
    fn handle(&self, req: &mut Request, res: &mut Response) {
        self(req, res)
    }
}

/// A method + pattern binding. Never changes after registration.
#[derive(Clone)]
pub struct Route {
    pub method: Method,
    pub pattern: String,
    /// Parameter names in the pattern, for introspection only
    pub param_names: Vec<String>,
    pub handler: Arc<dyn Handler>,
}

impl Route {
    pub fn new(method: Method, pattern: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        let pattern = pattern.into();
        Self {
            method,
            param_names: matcher::param_names(&pattern),
            pattern,
            handler,
        }
    }

    /// Returns the captured parameters if both method and path match.
    pub fn matches(&self, method: Method, path: &str) -> Option<Params> {
        if method != self.method {
            return None;
        }
        matcher::match_path(&self.pattern, path)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("param_names", &self.param_names)
            .finish()
    }
}

/// Routes in registration order; the first match wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, route: Route) {
        self.routes.push(route);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Linear scan for the first route accepting `method` and `path`.
    pub fn find(&self, method: Method, path: &str) -> Option<(&Route, Params)> {
        self.routes
            .iter()
            .find_map(|route| route.matches(method, path).map(|params| (route, params)))
    }
}
