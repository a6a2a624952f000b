//! Header rendering for log events.
//!
//! # Responsibilities
//! - Canonicalize header names (`x-secret` → `X-Secret`)
//! - Replace values of configured headers with a fixed placeholder
//!
//! # Design Decisions
//! - `HeaderMap` stores names lowercase, so redaction matches on the
//!   canonical form, case-sensitive
//! - Multi-valued headers keep every value, in order

use std::collections::{BTreeMap, HashSet};

use axum::http::HeaderMap;

/// Placeholder logged in place of a redacted header value.
pub const REDACTED: &str = "--redacted--";

/// Header names mapped to their values, ready to be logged as JSON.
pub type LoggedHeaders = BTreeMap<String, Vec<String>>;

/// Capitalize the first letter of each dash-separated word.
pub fn canonical_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        upper = c == '-';
    }
    out
}

/// Copy `headers` for logging, replacing redacted ones wholesale.
pub fn redact(headers: &HeaderMap, redact: &HashSet<String>) -> LoggedHeaders {
    let mut logged = LoggedHeaders::new();

    for name in headers.keys() {
        let key = canonical_key(name.as_str());
        let values = if redact.contains(&key) {
            vec![REDACTED.to_string()]
        } else {
            headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect()
        };
        logged.insert(key, values);
    }

    logged
}
