//! Pre-encoded field values.
//!
//! # Responsibilities
//! - Hold a JSON-compatible fragment ready to embed in an output line
//! - Remember whether that fragment is a quoted string
//! - Provide the append primitives the encoder builds values with
//!
//! # Design Decisions
//! - Bytes are appended into a `Vec<u8>` and frozen into `Bytes` once complete,
//!   so a stored value is never partially written and copies are shallow
//! - String escaping is delegated to `serde_json`

use std::fmt;
use std::io::Write;

use bytes::Bytes;

/// Marker appended to values cut short by `max_len`.
pub const TRUNCATED: &str = "--truncated--";

/// A field value, already encoded for output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Value {
    data: Bytes,
    quoted: bool,
}

impl Value {
    /// Encode a string with JSON escaping and surrounding quotes.
    pub fn string(s: &str) -> Self {
        let mut buf = ValueBuf::with_capacity(s.len() + 2);
        buf.push_quoted(s);
        buf.finish()
    }

    /// Wrap bytes that are already a complete fragment.
    pub fn from_raw(data: impl Into<Bytes>, quoted: bool) -> Self {
        Self {
            data: data.into(),
            quoted,
        }
    }

    /// The encoded fragment.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// True when the fragment is a quoted string.
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// Fragment for human display: surrounding quotes stripped from quoted values.
    pub fn display_bytes(&self) -> &[u8] {
        if self.quoted && self.data.len() >= 2 {
            &self.data[1..self.data.len() - 1]
        } else {
            &self.data
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.data))
    }
}

/// Append-only builder for a [`Value`].
#[derive(Debug, Default)]
pub(crate) struct ValueBuf {
    data: Vec<u8>,
    quoted: bool,
}

impl ValueBuf {
    pub(crate) fn with_capacity(cap: usize) -> Self {
        Self {
            data: Vec::with_capacity(cap),
            quoted: false,
        }
    }

    /// Append `s` as a JSON string literal.
    pub(crate) fn push_quoted(&mut self, s: &str) {
        // Serializing a str into a Vec cannot fail.
        let _ = serde_json::to_writer(&mut self.data, s);
        self.quoted = true;
    }

    /// Append `s` between bare quotes without escaping.
    pub(crate) fn push_raw_quoted(&mut self, s: &[u8]) {
        self.data.push(b'"');
        self.data.extend_from_slice(s);
        self.data.push(b'"');
        self.quoted = true;
    }

    pub(crate) fn push_bytes(&mut self, s: &[u8]) {
        self.data.extend_from_slice(s);
    }

    pub(crate) fn push_display(&mut self, v: impl fmt::Display) {
        let _ = write!(self.data, "{}", v);
    }

    pub(crate) fn finish(self) -> Value {
        Value {
            data: Bytes::from(self.data),
            quoted: self.quoted,
        }
    }
}

/// Cut `s` to at most `max_len` bytes on a char boundary, appending [`TRUNCATED`].
///
/// A `max_len` of zero disables truncation.
pub fn truncate(s: &str, max_len: usize) -> std::borrow::Cow<'_, str> {
    if max_len == 0 || s.len() <= max_len {
        return std::borrow::Cow::Borrowed(s);
    }

    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }

    let mut out = String::with_capacity(end + TRUNCATED.len());
    out.push_str(&s[..end]);
    out.push_str(TRUNCATED);
    std::borrow::Cow::Owned(out)
}
