use std::collections::HashMap;
use std::fmt;

use crate::http::parser;

/// HTTP request methods.
///
/// Only the five methods the router can bind are represented. Anything else on
/// the request line is read as GET.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// OPTIONS - Describe communication options (CORS preflight)
    OPTIONS,
}

/// Represents a parsed HTTP request from a client.
///
/// Built from the request line, then filled in as headers and body arrive.
/// `params` stays empty until a route matches.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Decoded request path without the query string (e.g., "/index.html")
    pub path: String,
    /// HTTP version token (typically "HTTP/1.1")
    pub version: String,
    /// Request headers; the last occurrence of a name wins
    pub headers: HashMap<String, String>,
    /// Percent-decoded query parameters
    pub query: HashMap<String, String>,
    /// Request body, empty if none was sent
    pub body: String,
    /// Route parameters captured by the matched pattern
    pub params: HashMap<String, String>,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Method,
    target: String,
    version: Option<String>,
    headers: HashMap<String, String>,
    body: String,
}

impl Method {
    /// All methods, in the order `App::all` registers them.
    pub const ALL: [Method; 5] = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    /// Parses a method token.
    ///
    /// The match is case-sensitive; unknown tokens fall back to GET.
    ///
    /// # Example
    ///
    /// ```
    /// # use microexpress::http::request::Method;
    /// assert_eq!(Method::from_token("DELETE"), Method::DELETE);
    /// assert_eq!(Method::from_token("PATCH"), Method::GET);
    /// ```
    pub fn from_token(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "OPTIONS" => Method::OPTIONS,
            _ => Method::GET,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::OPTIONS => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            target: "/".to_string(),
            version: None,
            headers: HashMap::new(),
            body: String::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Request target as it would appear on the wire; a query string is split off.
    pub fn path(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Request {
        let (path, query) = parser::split_target(&self.target);
        Request {
            method: self.method,
            path,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            query,
            body: self.body,
            params: HashMap::new(),
        }
    }
}

impl Request {
    /// Builds a request from its request line, e.g. `GET /a?b=c HTTP/1.1`.
    ///
    /// A line missing either space leaves the request degenerate: GET with an
    /// empty path and version, which no route will match.
    pub fn new(request_line: &str) -> Self {
        let mut req = Request {
            method: Method::GET,
            path: String::new(),
            version: String::new(),
            headers: HashMap::new(),
            query: HashMap::new(),
            body: String::new(),
            params: HashMap::new(),
        };

        if let Some(line) = parser::parse_request_line(request_line) {
            let (path, query) = parser::split_target(line.target);
            req.method = Method::from_token(line.method);
            req.path = path;
            req.version = line.version.to_string();
            req.query = query;
        }

        req
    }

    /// Feeds one raw header line. Lines without a usable colon are ignored.
    pub fn add_header(&mut self, line: &str) {
        if let Some((name, value)) = parser::parse_header_line(line) {
            self.headers.insert(name, value);
        }
    }

    /// Header value by exact name, `""` when absent.
    pub fn header(&self, key: &str) -> &str {
        self.headers.get(key).map(String::as_str).unwrap_or("")
    }

    /// Query parameter by name, `""` when absent.
    pub fn query(&self, key: &str) -> &str {
        self.query.get(key).map(String::as_str).unwrap_or("")
    }

    /// Route parameter by name, `""` when absent or before a route matched.
    pub fn param(&self, key: &str) -> &str {
        self.params.get(key).map(String::as_str).unwrap_or("")
    }

    /// Retrieves the Content-Length header value and parses it as a usize.
    ///
    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length").trim().parse().unwrap_or(0)
    }
}
