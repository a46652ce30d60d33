use std::collections::{BTreeMap, HashMap, VecDeque};
use std::io::Read;
use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};

use crate::http::mime;
use crate::storage::Storage;
use crate::template;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Files are copied out of storage this many bytes at a time.
pub const FILE_CHUNK_SIZE: usize = 1024;

/// Returns the reason phrase for a status code.
///
/// Only the codes the engine itself produces or that handlers commonly use are
/// named; everything else is "Unknown".
///
/// # Example
///
/// ```
/// # use microexpress::http::response::reason_phrase;
/// assert_eq!(reason_phrase(200), "OK");
/// assert_eq!(reason_phrase(404), "Not Found");
/// assert_eq!(reason_phrase(418), "Unknown");
/// ```
pub fn reason_phrase(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// One piece of outbound data, in the order it goes on the wire.
pub enum BodyPart {
    Bytes(Bytes),
    /// A file copied to the socket `FILE_CHUNK_SIZE` bytes at a time
    Reader(Box<dyn Read + Send>),
}

/// The response for one connection.
///
/// Small writes go into an outbound buffer; files are queued as readers so their
/// contents never sit in memory as a whole. The dispatcher flushes everything to
/// the socket once the request has been handled. The status line and headers
/// reach the buffer exactly once: the first body write (or `end`) emits them,
/// and later changes to status or headers are ignored.
pub struct Response {
    status: u16,
    headers: BTreeMap<String, String>,
    headers_sent: bool,
    closed: bool,
    wire: BytesMut,
    queued: VecDeque<BodyPart>,
    storage: Arc<dyn Storage>,
}

impl Response {
    /// Creates a 200 response with `Content-Type: text/html` and
    /// `Connection: close`.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "text/html".to_string());
        headers.insert("Connection".to_string(), "close".to_string());

        Self {
            status: 200,
            headers,
            headers_sent: false,
            closed: false,
            wire: BytesMut::with_capacity(FILE_CHUNK_SIZE),
            queued: VecDeque::new(),
            storage,
        }
    }

    pub fn status(&mut self, code: u16) -> &mut Self {
        if self.headers_sent {
            tracing::debug!(code, "status ignored, headers already sent");
        } else {
            self.status = code;
        }
        self
    }

    /// Adds or replaces a header. Ignored once headers are on the wire.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        if self.headers_sent {
            tracing::debug!(header = %name, "header ignored, headers already sent");
        } else {
            self.headers.insert(name, value.into());
        }
        self
    }

    /// Writes `body` after emitting headers if that has not happened yet.
    pub fn send(&mut self, body: impl AsRef<[u8]>) -> &mut Self {
        self.send_headers();
        self.write_body(body.as_ref());
        self
    }

    pub fn send_json(&mut self, json: impl AsRef<[u8]>) -> &mut Self {
        self.set_header("Content-Type", "application/json");
        self.send(json)
    }

    /// Streams a file from storage with a Content-Type guessed from its extension.
    ///
    /// The file is queued rather than read here; its contents are copied to the
    /// socket in `FILE_CHUNK_SIZE` pieces when the response is flushed. A missing
    /// file becomes a 404 and a file that cannot be opened a 500, both with a
    /// short plain body.
    pub fn send_file(&mut self, path: &str) -> &mut Self {
        if !self.storage.exists(path) {
            tracing::debug!(path, "file not found");
            return self.status(404).send("File not found");
        }

        let file = match self.storage.open(path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path, error = %e, "failed to open file");
                return self.status(500).send("Failed to open file");
            }
        };

        self.set_header("Content-Type", mime::content_type(path));
        self.send_headers();
        self.queue_reader(file);

        self
    }

    /// Loads a text template, substitutes `{{name}}` placeholders and sends it.
    pub fn render(&mut self, template_path: &str, vars: &HashMap<String, String>) -> &mut Self {
        if !self.storage.exists(template_path) {
            return self.status(404).send("Template not found");
        }

        let mut content = String::new();
        let loaded = self
            .storage
            .open(template_path)
            .and_then(|mut file| file.read_to_string(&mut content));

        if let Err(e) = loaded {
            tracing::warn!(path = template_path, error = %e, "failed to load template");
            return self.status(500).send("Failed to open template file");
        }

        let rendered = template::substitute(&content, vars);
        self.send(rendered)
    }

    /// Makes sure headers were emitted and marks the response finished.
    ///
    /// Anything written afterwards is discarded. The dispatcher calls this on
    /// every path before closing the connection, so handlers may call it too.
    pub fn end(&mut self) {
        self.send_headers();
        self.closed = true;
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    /// Header value by exact name, `""` when absent.
    pub fn header(&self, name: &str) -> &str {
        self.headers.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Bytes buffered since the last queued file, status line included when no
    /// file has been queued yet.
    pub fn wire(&self) -> &[u8] {
        &self.wire
    }

    /// Outbound bytes held in memory. Queued files are not counted.
    pub fn buffered_len(&self) -> usize {
        let queued: usize = self
            .queued
            .iter()
            .map(|part| match part {
                BodyPart::Bytes(bytes) => bytes.len(),
                BodyPart::Reader(_) => 0,
            })
            .sum();
        queued + self.wire.len()
    }

    /// Takes everything still to be written, in wire order, leaving the
    /// response empty.
    pub fn take_body(&mut self) -> VecDeque<BodyPart> {
        self.flush_wire();
        std::mem::take(&mut self.queued)
    }

    fn send_headers(&mut self) {
        if self.headers_sent || self.closed {
            return;
        }

        self.wire.put_slice(
            format!(
                "{} {} {}\r\n",
                HTTP_VERSION,
                self.status,
                reason_phrase(self.status)
            )
            .as_bytes(),
        );

        for (k, v) in &self.headers {
            self.wire.put_slice(k.as_bytes());
            self.wire.put_slice(b": ");
            self.wire.put_slice(v.as_bytes());
            self.wire.put_slice(b"\r\n");
        }

        self.wire.put_slice(b"\r\n");
        self.headers_sent = true;
    }

    fn queue_reader(&mut self, reader: Box<dyn Read + Send>) {
        if self.closed {
            tracing::debug!("file queued after end dropped");
            return;
        }
        self.flush_wire();
        self.queued.push_back(BodyPart::Reader(reader));
    }

    fn flush_wire(&mut self) {
        if !self.wire.is_empty() {
            self.queued.push_back(BodyPart::Bytes(self.wire.split().freeze()));
        }
    }

    fn write_body(&mut self, body: &[u8]) {
        if self.closed {
            tracing::debug!(len = body.len(), "write after end dropped");
            return;
        }
        self.wire.put_slice(body);
    }
}
