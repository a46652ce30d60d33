//! microexpress - single-connection HTTP engine
//!
//! Routing, middleware and request/response handling for small network devices.

pub mod app;
pub mod config;
pub mod http;
pub mod messaging;
pub mod router;
pub mod server;
pub mod storage;
pub mod template;

pub use app::App;
pub use http::request::{Method, Request};
pub use http::response::Response;
pub use router::middleware::Next;
