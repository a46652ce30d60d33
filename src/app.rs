//! Application setup: routes, middleware, static mounts, CORS and the
//! messaging hooks.
//!
//! An `App` is assembled once with the builder methods and then only read. The
//! connection dispatcher borrows it for every request.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::messaging::{ClientCallback, ClientId, EventCallback, MessageBus, MessageCallback, WsEvent, WsHandlers};
use crate::router::{Handler, Middleware, MiddlewareChain, Next, Route, RouteTable, StaticMount, StaticMounts};
use crate::storage::{FsStorage, Storage};

/// Body of the response sent when nothing handles a request.
pub const NOT_FOUND_BODY: &str =
    "<h1>404 Not Found</h1><p>The requested resource was not found on this server.</p>";

pub const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type";

pub struct App {
    routes: RouteTable,
    middleware: MiddlewareChain,
    statics: StaticMounts,
    cors_origin: Option<String>,
    ws: WsHandlers,
    storage: Arc<dyn Storage>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// An empty app reading files relative to the working directory.
    pub fn new() -> Self {
        Self {
            routes: RouteTable::new(),
            middleware: MiddlewareChain::new(),
            statics: StaticMounts::new(),
            cors_origin: None,
            ws: WsHandlers::default(),
            storage: Arc::new(FsStorage::new(".")),
        }
    }

    /// Applies the storage root, static mounts and CORS settings from `cfg`.
    pub fn configure(mut self, cfg: &Config) -> Self {
        self.storage = Arc::new(FsStorage::new(&cfg.storage.root));
        for mount in &cfg.static_files {
            self = self.serve_static(&mount.virtual_path, &mount.fs_path);
        }
        if let Some(cors) = &cfg.cors {
            self = self.enable_cors(&cors.origin);
        }
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    /// Binds any [`Handler`] implementation.
    pub fn route(mut self, method: Method, pattern: &str, handler: impl Handler + 'static) -> Self {
        self.routes.push(Route::new(method, pattern, Arc::new(handler)));
        self
    }

    pub fn get<F>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(&mut Request, &mut Response) + Send + Sync + 'static,
    {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post<F>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(&mut Request, &mut Response) + Send + Sync + 'static,
    {
        self.route(Method::POST, pattern, handler)
    }

    pub fn put<F>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(&mut Request, &mut Response) + Send + Sync + 'static,
    {
        self.route(Method::PUT, pattern, handler)
    }

    pub fn delete<F>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(&mut Request, &mut Response) + Send + Sync + 'static,
    {
        self.route(Method::DELETE, pattern, handler)
    }

    pub fn options<F>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(&mut Request, &mut Response) + Send + Sync + 'static,
    {
        self.route(Method::OPTIONS, pattern, handler)
    }

    /// Registers the same handler for every method.
    pub fn all<F>(mut self, pattern: &str, handler: F) -> Self
    where
        F: Fn(&mut Request, &mut Response) + Send + Sync + 'static,
    {
        let handler: Arc<dyn Handler> = Arc::new(handler);
        for method in Method::ALL {
            self.routes.push(Route::new(method, pattern, handler.clone()));
        }
        self
    }

    /// Appends a middleware closure. Middleware runs in registration order.
    pub fn use_fn<F>(self, middleware: F) -> Self
    where
        F: Fn(&mut Request, &mut Response) -> Next + Send + Sync + 'static,
    {
        self.use_middleware(middleware)
    }

    pub fn use_middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Serves GET requests under `virtual_prefix` from `backing_prefix` in storage.
    pub fn serve_static(mut self, virtual_prefix: &str, backing_prefix: &str) -> Self {
        self.statics.push(StaticMount::new(virtual_prefix, backing_prefix));
        self
    }

    pub fn enable_cors(mut self, origin: &str) -> Self {
        self.cors_origin = Some(origin.to_string());
        self
    }

    /// Enables the messaging side channel. `path` is where HTTP clients asking
    /// for an upgrade get pointed at the bus.
    pub fn ws<F>(mut self, path: &str, callback: F) -> Self
    where
        F: Fn(&mut dyn MessageBus, ClientId, &WsEvent) + Send + Sync + 'static,
    {
        self.ws.path = Some(path.to_string());
        self.ws.on_event = Some(Arc::new(callback) as Arc<dyn EventCallback>);
        self
    }

    pub fn on_ws_connect<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut dyn MessageBus, ClientId) + Send + Sync + 'static,
    {
        self.ws.on_connect = Some(Arc::new(callback) as Arc<dyn ClientCallback>);
        self
    }

    pub fn on_ws_disconnect<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut dyn MessageBus, ClientId) + Send + Sync + 'static,
    {
        self.ws.on_disconnect = Some(Arc::new(callback) as Arc<dyn ClientCallback>);
        self
    }

    pub fn on_ws_message<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut dyn MessageBus, ClientId, &[u8]) + Send + Sync + 'static,
    {
        self.ws.on_message = Some(Arc::new(callback) as Arc<dyn MessageCallback>);
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn cors_origin(&self) -> Option<&str> {
        self.cors_origin.as_deref()
    }

    pub fn ws_handlers(&self) -> &WsHandlers {
        &self.ws
    }

    pub fn storage(&self) -> Arc<dyn Storage> {
        self.storage.clone()
    }

    /// A fresh response for one connection, backed by this app's storage.
    pub fn new_response(&self) -> Response {
        Response::new(self.storage())
    }

    /// Renders a template from storage into `res`.
    pub fn render<'r>(
        &self,
        res: &'r mut Response,
        template_path: &str,
        vars: &HashMap<String, String>,
    ) -> &'r mut Response {
        res.render(template_path, vars)
    }

    /// True when `req` asks to upgrade to the messaging side channel.
    pub fn is_upgrade_request(&self, req: &Request) -> bool {
        match &self.ws.path {
            Some(path) => {
                req.method == Method::GET
                    && req.path == *path
                    && req.header("Upgrade") == "websocket"
            }
            None => false,
        }
    }

    /// Runs the middleware chain, then routes the request if every middleware
    /// continued.
    pub fn dispatch(&self, req: &mut Request, res: &mut Response) {
        if self.middleware.run(req, res) == Next::Continue {
            self.handle_request(req, res);
        }
    }

    /// Static mounts first, then the route table, then the fixed 404 page.
    pub fn handle_request(&self, req: &mut Request, res: &mut Response) {
        if self.serve_static_file(req, res) {
            return;
        }

        if let Some((route, params)) = self.routes.find(req.method, &req.path) {
            tracing::debug!(
                method = %req.method,
                path = %req.path,
                pattern = %route.pattern,
                "route matched"
            );
            req.params = params;
            route.handler.handle(req, res);
            return;
        }

        tracing::debug!(method = %req.method, path = %req.path, "no route matched");
        res.status(404).send(NOT_FOUND_BODY);
    }

    fn serve_static_file(&self, req: &Request, res: &mut Response) -> bool {
        if req.method != Method::GET {
            return false;
        }

        match self.statics.resolve(&req.path) {
            Some(file_path) => {
                tracing::debug!(path = %req.path, file = %file_path, "serving static file");
                res.send_file(&file_path);
                true
            }
            None => false,
        }
    }
}
