//! Ordered request interceptors.
//!
//! Each middleware sees the request and response before routing and returns
//! whether the chain should go on. Stopping leaves the response exactly as the
//! middleware left it; nothing is sent on its behalf.

use std::sync::Arc;

use crate::http::request::Request;
use crate::http::response::Response;

/// What the chain does after a middleware returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Run the next middleware, or route the request after the last one
    Continue,
    /// End processing here
    Stop,
}

pub trait Middleware: Send + Sync {
    fn handle(&self, req: &mut Request, res: &mut Response) -> Next;
}

impl<F> Middleware for F
where
    F: Fn(&mut Request, &mut Response) -> Next + Send + Sync,
{
    fn handle(&self, req: &mut Request, res: &mut Response) -> Next {
        self(req, res)
    }
}

#[derive(Clone, Default)]
pub struct MiddlewareChain {
    entries: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, middleware: Arc<dyn Middleware>) {
        self.entries.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs every entry in registration order.
    ///
    /// Returns `Next::Continue` only if all of them continued (trivially so for
    /// an empty chain).
    pub fn run(&self, req: &mut Request, res: &mut Response) -> Next {
        let mut index = 0;

        while let Some(entry) = self.entries.get(index) {
            if entry.handle(req, res) == Next::Stop {
                tracing::debug!(index, path = %req.path, "middleware stopped the chain");
                return Next::Stop;
            }
            index += 1;
        }

        Next::Continue
    }
}
