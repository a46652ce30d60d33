//! Request routing: pattern matching, the route table, middleware and static mounts.

pub mod matcher;
pub mod middleware;
pub mod route;
pub mod statics;

pub use matcher::{Params, match_path};
pub use middleware::{Middleware, MiddlewareChain, Next};
pub use route::{Handler, Route, RouteTable};
pub use statics::{StaticMount, StaticMounts};
