// URI template resolution.
// Fills `:param` placeholders and appends leftover parameters as a query string.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::{Error, Result};

/// Endpoint templates for the GitHub REST API.
pub mod templates {
    pub const USER: &str = "/users/:login";
    pub const FOLLOWERS: &str = "/users/:login/followers";
    pub const FOLLOWING: &str = "/users/:login/following";
    pub const SEARCH: &str = "/search/users?q=:query";
}

/// Escapes everything outside the RFC 3986 unreserved set.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn encode(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Resolve a path template against a parameter list.
///
/// Every `:name` placeholder is replaced with the percent-encoded value for
/// `name`; a placeholder with no matching value is a hard error, since a
/// literal `:name` must never reach the network. Parameters not consumed by
/// any placeholder are appended as an encoded `key=value` query string.
///
/// Pure function: no I/O, no state.
pub fn resolve(template: &str, params: &[(&str, &str)]) -> Result<String> {
    let mut path = String::with_capacity(template.len());
    let mut used = vec![false; params.len()];
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != ':' {
            path.push(c);
            continue;
        }

        let mut name = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                name.push(next);
                chars.next();
            } else {
                break;
            }
        }

        // A bare `:` with no identifier is literal text.
        if name.is_empty() {
            path.push(':');
            continue;
        }

        match params.iter().position(|(key, _)| *key == name) {
            Some(i) => {
                used[i] = true;
                path.push_str(&encode(params[i].1));
            }
            None => return Err(Error::UnresolvedPlaceholder(name)),
        }
    }

    for (i, (key, value)) in params.iter().enumerate() {
        if used[i] {
            continue;
        }
        path.push(if path.contains('?') { '&' } else { '?' });
        path.push_str(&encode(key));
        path.push('=');
        path.push_str(&encode(value));
    }

    Ok(path)
}
