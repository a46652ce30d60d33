//! `{{name}}` placeholder substitution for text templates.

use std::collections::HashMap;

/// Replaces every `{{key}}` in `content` with its value from `vars`.
///
/// Placeholders with no entry in `vars` are left untouched.
pub fn substitute(content: &str, vars: &HashMap<String, String>) -> String {
    let mut out = content.to_string();
    for (key, value) in vars {
        let placeholder = format!("{{{{{}}}}}", key);
        out = out.replace(&placeholder, value);
    }
    out
}
