/// Content types by file extension, checked as path suffixes.
const CONTENT_TYPES: &[(&str, &str)] = &[
    (".html", "text/html"),
    (".css", "text/css"),
    (".js", "application/javascript"),
    (".json", "application/json"),
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".gif", "image/gif"),
    (".ico", "image/x-icon"),
    (".xml", "text/xml"),
    (".pdf", "application/pdf"),
    (".zip", "application/zip"),
    (".gz", "application/gzip"),
    (".svg", "image/svg+xml"),
];

/// Returns the MIME type for a file path, `text/plain` when the extension is unknown.
///
/// # Example
///
/// ```
/// # use microexpress::http::mime::content_type;
/// assert_eq!(content_type("/www/app.js"), "application/javascript");
/// assert_eq!(content_type("/www/notes.md"), "text/plain");
/// ```
pub fn content_type(path: &str) -> &'static str {
    CONTENT_TYPES
        .iter()
        .find(|(ext, _)| path.ends_with(ext))
        .map(|(_, mime)| *mime)
        .unwrap_or("text/plain")
}
