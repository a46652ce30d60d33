#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io::{self, Cursor, Read};
use std::sync::Arc;

use microexpress::Response;
use microexpress::http::writer::ResponseWriter;
use microexpress::storage::Storage;

/// In-memory storage with optional files that exist but refuse to open.
#[derive(Default)]
pub struct MemoryStorage {
    files: HashMap<String, Vec<u8>>,
    locked: HashSet<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.to_string(), content.into());
        self
    }

    pub fn with_locked(mut self, path: &str) -> Self {
        self.locked.insert(path.to_string());
        self
    }

    pub fn shared(self) -> Arc<dyn Storage> {
        Arc::new(self)
    }
}

impl Storage for MemoryStorage {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path) || self.locked.contains(path)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        if self.locked.contains(path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"));
        }
        let content = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
        Ok(Box::new(Cursor::new(content)))
    }
}

pub fn empty_response() -> Response {
    Response::new(MemoryStorage::new().shared())
}

/// Everything the response would put on the socket, queued files included.
pub fn drain(res: &mut Response) -> Vec<u8> {
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let mut out = Vec::new();
    runtime
        .block_on(ResponseWriter::new(res).write_to_stream(&mut out))
        .unwrap();
    out
}

/// Splits raw response bytes into (status line, header block, body).
pub fn split_wire(wire: &[u8]) -> (String, String, String) {
    let text = String::from_utf8_lossy(wire).into_owned();
    let (head, body) = text
        .split_once("\r\n\r\n")
        .map(|(h, b)| (h.to_string(), b.to_string()))
        .unwrap_or((text.clone(), String::new()));
    let (status, headers) = head
        .split_once("\r\n")
        .map(|(s, h)| (s.to_string(), h.to_string()))
        .unwrap_or((head.clone(), String::new()));
    (status, headers, body)
}
