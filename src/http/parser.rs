use std::collections::HashMap;

/// The three tokens of a request line, borrowed from the input.
#[derive(Debug, PartialEq, Eq)]
pub struct RequestLine<'a> {
    pub method: &'a str,
    pub target: &'a str,
    pub version: &'a str,
}

/// Splits `METHOD SP TARGET SP VERSION` on the first two spaces.
///
/// Returns `None` when either space is missing. Everything after the second
/// space is the version, spaces included.
pub fn parse_request_line(line: &str) -> Option<RequestLine<'_>> {
    let (method, rest) = line.split_once(' ')?;
    let (target, version) = rest.split_once(' ')?;

    Some(RequestLine {
        method,
        target,
        version,
    })
}

/// Splits a header line on its first colon.
///
/// The name is kept verbatim and the value trimmed. A colon at index 0 or no
/// colon at all yields `None`.
pub fn parse_header_line(line: &str) -> Option<(String, String)> {
    match line.find(':') {
        Some(pos) if pos > 0 => Some((
            line[..pos].to_string(),
            line[pos + 1..].trim().to_string(),
        )),
        _ => None,
    }
}

/// Separates a request target into its path and decoded query mapping.
///
/// The path itself is returned as received; only query keys and values are
/// percent-decoded.
pub fn split_target(target: &str) -> (String, HashMap<String, String>) {
    match target.split_once('?') {
        Some((path, raw_query)) => (path.to_string(), parse_query(raw_query)),
        None => (target.to_string(), HashMap::new()),
    }
}

/// Parses `a=1&b=2` into a mapping. Pairs without `=` are dropped.
pub fn parse_query(raw: &str) -> HashMap<String, String> {
    raw.split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (url_decode(key), url_decode(value)))
        .collect()
}

/// Decodes `+` as space and `%XX` as the byte `0xXX`.
///
/// A `%` not followed by two hex digits is kept literally. Invalid UTF-8 in the
/// decoded bytes is replaced rather than rejected.
pub fn url_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => match (bytes.get(i + 1).and_then(hex_value), bytes.get(i + 2).and_then(hex_value)) {
                (Some(hi), Some(lo)) => {
                    out.push((hi << 4) | lo);
                    i += 3;
                }
                _ => {
                    out.push(b'%');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: &u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
