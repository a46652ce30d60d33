//! Route pattern matching.
//!
//! Patterns are literal paths in which a segment starting with `:` captures
//! the corresponding request path segment, e.g. `/user/:id`.
//!
//! - Literal bytes must match exactly (case-sensitive)
//! - A parameter consumes the request path up to the next `/` or the end
//! - Pattern and path must be consumed together; no trailing slash folding
//! - Adjacent parameters without a literal between them are not supported

use std::collections::HashMap;

use crate::http::parser::url_decode;

/// Marks the start of a named segment in a route pattern.
pub const PARAM_MARKER: u8 = b':';

/// Captured parameter values by name, already percent-decoded.
pub type Params = HashMap<String, String>;

/// Matches `path` against `pattern`, returning the captured parameters.
///
/// # Example
///
/// ```
/// # use microexpress::router::matcher::match_path;
/// let params = match_path("/user/:id", "/user/42").unwrap();
/// assert_eq!(params["id"], "42");
/// assert!(match_path("/user/:id", "/user/42/extra").is_none());
/// ```
pub fn match_path(pattern: &str, path: &str) -> Option<Params> {
    let mut params = Params::new();

    if pattern == path {
        return Some(params);
    }

    let pat = pattern.as_bytes();
    let req = path.as_bytes();
    let (mut pi, mut ri) = (0, 0);

    while pi < pat.len() && ri < req.len() {
        if pat[pi] == PARAM_MARKER {
            let name_start = pi + 1;
            pi = segment_end(pat, pi);
            let value_start = ri;
            ri = segment_end(req, ri);

            // Both ends sit on '/' or the end of input, so these are char boundaries.
            params.insert(
                pattern[name_start..pi].to_string(),
                url_decode(&path[value_start..ri]),
            );
        } else {
            if pat[pi] != req[ri] {
                return None;
            }
            pi += 1;
            ri += 1;
        }
    }

    (pi == pat.len() && ri == req.len()).then_some(params)
}

/// Names of the parameters in `pattern`, in order of appearance.
pub fn param_names(pattern: &str) -> Vec<String> {
    let bytes = pattern.as_bytes();
    let mut names = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == PARAM_MARKER {
            let end = segment_end(bytes, i);
            names.push(pattern[i + 1..end].to_string());
            i = end;
        } else {
            i += 1;
        }
    }

    names
}

fn segment_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'/')
        .map(|offset| from + offset)
        .unwrap_or(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let params = match_path("/about", "/about").unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_trailing_slash_is_significant() {
        assert!(match_path("/about", "/about/").is_none());
        assert!(match_path("/about/", "/about").is_none());
    }

    #[test]
    fn test_param_names() {
        assert_eq!(param_names("/a/:x/b/:y"), vec!["x", "y"]);
        assert!(param_names("/plain").is_empty());
    }
}
