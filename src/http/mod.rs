//! HTTP protocol implementation.
//!
//! This module implements a one-request-per-connection HTTP/1.x engine.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: The per-connection dispatcher implementing the request lifecycle
//! - **`parser`**: Request line, header line and query string parsing, percent-decoding
//! - **`request`**: HTTP request representation and accessors
//! - **`response`**: One-shot response with header emission, files and templates
//! - **`writer`**: Flushes a finished response to the client
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │  AwaitData  │ ← Bounded wait for the first byte (timeout → Closed)
//!        └──────┬──────┘
//!               ▼
//!        ┌──────────────────┐
//!        │ ReadRequestLine  │
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │   ReadHeaders    │ ← Until the blank line
//!        └──────┬───────────┘
//!               │ Content-Length > 0
//!               ▼
//!        ┌──────────────────┐
//!        │    ReadBody      │ ← Exactly Content-Length bytes
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │   Preprocess     │ ← Upgrade notice, CORS, OPTIONS → 204
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │    Dispatch      │ ← Middleware → static mounts → routes → 404
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │    Finalize      │ ← end(), flush, shutdown
//!        └──────┬───────────┘
//!               ▼
//!             Closed
//! ```
//!
//! Read errors, timeouts and exceeded limits jump straight to `Closed`.
//!
//! # Example
//!
//! ```ignore
//! use microexpress::{App, config::ServerConfig, http::connection::Connection};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::new().get("/", |_req, res| { res.send("hello"); });
//!     let settings = ServerConfig::default();
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         Connection::new(socket, &app, &settings, "127.0.0.1").run().await;
//!     }
//! }
//! ```

pub mod request;
pub mod response;
pub mod parser;
pub mod connection;
pub mod writer;
pub mod mime;
