//! Call-site argument encoding.
//!
//! # Responsibilities
//! - Model call-site data as a list of [`Arg`] items, read as alternating
//!   key/value pairs with [`Attr`] as a ready-made pair
//! - Encode each value once, at the call site, into a [`Value`]
//! - Degrade malformed lists to a `!BADKEY` field instead of failing
//!
//! # Encoding
//! | Kind      | Output                                   |
//! |-----------|------------------------------------------|
//! | string    | JSON-escaped, quoted                     |
//! | bool      | `true` / `false`                         |
//! | time      | quoted RFC 3339, UTC, whole seconds      |
//! | duration  | integer nanoseconds                      |
//! | int/uint  | decimal                                  |
//! | float     | shortest round-trip decimal              |
//! | null      | `null`                                   |
//! | structured| marshaled JSON, escaped or raw-quoted    |

use std::borrow::Cow;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::log::fields::Fields;
use crate::log::value::{truncate, Value, ValueBuf};

/// Key used when an item cannot be paired with a field name.
pub const BAD_KEY: &str = "!BADKEY";

/// One item of a call-site key/value list.
#[derive(Debug)]
pub enum Arg<'a> {
    Str(Cow<'a, str>),
    Bool(bool),
    Time(DateTime<Utc>),
    Duration(Duration),
    Int(i64),
    Uint(u64),
    Float(f64),
    Null,
    /// A structured value, marshaled where the argument was built.
    Json(Result<String, serde_json::Error>),
    Attr(Attr<'a>),
}

impl Arg<'static> {
    /// Marshal any serializable value; failures are kept and logged later.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        Arg::Json(serde_json::to_string(value))
    }
}

/// A key/value pair that can stand on its own in an argument list.
#[derive(Debug)]
pub struct Attr<'a> {
    pub key: Cow<'a, str>,
    pub value: Box<Arg<'a>>,
}

impl<'a> Attr<'a> {
    pub fn new(key: impl Into<Cow<'a, str>>, value: impl Into<Arg<'a>>) -> Self {
        Self {
            key: key.into(),
            value: Box::new(value.into()),
        }
    }
}

/// Build a `Vec<Arg>` from an alternating key/value list.
///
/// ```
/// use fieldlog::kv;
/// let args = kv!["method", "GET", "status", 200_u16];
/// assert_eq!(args.len(), 4);
/// ```
#[macro_export]
macro_rules! kv {
    () => {
        ::std::vec::Vec::<$crate::log::Arg<'_>>::new()
    };
    ($($item:expr),+ $(,)?) => {
        ::std::vec![$($crate::log::Arg::from($item)),+]
    };
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(v: &'a str) -> Self {
        Arg::Str(Cow::Borrowed(v))
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(v: &'a String) -> Self {
        Arg::Str(Cow::Borrowed(v.as_str()))
    }
}

impl From<String> for Arg<'_> {
    fn from(v: String) -> Self {
        Arg::Str(Cow::Owned(v))
    }
}

impl<'a> From<Cow<'a, str>> for Arg<'a> {
    fn from(v: Cow<'a, str>) -> Self {
        Arg::Str(v)
    }
}

impl From<bool> for Arg<'_> {
    fn from(v: bool) -> Self {
        Arg::Bool(v)
    }
}

macro_rules! from_int {
    ($variant:ident, $as:ty, $($t:ty),+) => {
        $(
            impl From<$t> for Arg<'_> {
                fn from(v: $t) -> Self {
                    Arg::$variant(v as $as)
                }
            }
        )+
    };
}

from_int!(Int, i64, i8, i16, i32, i64, isize);
from_int!(Uint, u64, u8, u16, u32, u64, usize);

impl From<f32> for Arg<'_> {
    fn from(v: f32) -> Self {
        Arg::Float(f64::from(v))
    }
}

impl From<f64> for Arg<'_> {
    fn from(v: f64) -> Self {
        Arg::Float(v)
    }
}

impl From<DateTime<Utc>> for Arg<'_> {
    fn from(v: DateTime<Utc>) -> Self {
        Arg::Time(v)
    }
}

impl From<SystemTime> for Arg<'_> {
    fn from(v: SystemTime) -> Self {
        Arg::Time(v.into())
    }
}

impl From<Duration> for Arg<'_> {
    fn from(v: Duration) -> Self {
        Arg::Duration(v)
    }
}

impl<'a> From<Attr<'a>> for Arg<'a> {
    fn from(v: Attr<'a>) -> Self {
        Arg::Attr(v)
    }
}

impl<'a, T: Into<Arg<'a>>> From<Option<T>> for Arg<'a> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Arg::Null, Into::into)
    }
}

/// Turns argument lists into [`Fields`].
#[derive(Debug, Clone, Copy)]
pub struct Encoder {
    /// Structured values are JSON-escaped into a string when true, or
    /// wrapped in bare quotes when false.
    pub escape: bool,
    /// Longest string or structured text kept before truncation; 0 keeps all.
    pub max_len: usize,
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            escape: true,
            max_len: 0,
        }
    }
}

impl Encoder {
    /// Encode an alternating key/value list.
    ///
    /// A trailing key without a value, or a value where a key was expected,
    /// lands under [`BAD_KEY`]. Later keys overwrite earlier ones.
    pub fn encode(&self, args: &[Arg<'_>]) -> Fields {
        let mut fields = Fields::new();
        let mut rest = args;

        while let Some((first, tail)) = rest.split_first() {
            rest = tail;
            match first {
                Arg::Attr(attr) => {
                    fields.insert(attr.key.as_ref(), self.value(&attr.value));
                }
                Arg::Str(key) => match tail.split_first() {
                    Some((val, tail)) => {
                        fields.insert(key.as_ref(), self.value(val));
                        rest = tail;
                    }
                    None => fields.insert(BAD_KEY, self.value(first)),
                },
                other => fields.insert(BAD_KEY, self.value(other)),
            }
        }

        fields
    }

    /// Encode a single value.
    pub fn value(&self, arg: &Arg<'_>) -> Value {
        let mut buf = ValueBuf::with_capacity(16);

        match arg {
            Arg::Str(s) => buf.push_quoted(&truncate(s, self.max_len)),
            Arg::Bool(b) => buf.push_display(b),
            Arg::Time(t) => buf.push_quoted(&t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Arg::Duration(d) => buf.push_display(d.as_nanos()),
            Arg::Int(n) => buf.push_display(n),
            Arg::Uint(n) => buf.push_display(n),
            Arg::Float(f) => push_float(&mut buf, *f),
            Arg::Null => buf.push_bytes(b"null"),
            Arg::Json(Ok(text)) => {
                let text = truncate(text, self.max_len);
                if self.escape {
                    buf.push_quoted(&text);
                } else {
                    buf.push_raw_quoted(text.as_bytes());
                }
            }
            Arg::Json(Err(err)) => {
                return Value::string(&format!("failed to marshal value: {}", err));
            }
            Arg::Attr(attr) => return self.value(&attr.value),
        }

        buf.finish()
    }
}

fn push_float(buf: &mut ValueBuf, f: f64) {
    if f.is_nan() {
        buf.push_quoted("NaN");
    } else if f.is_infinite() {
        buf.push_quoted(if f > 0.0 { "+Inf" } else { "-Inf" });
    } else {
        let mut text = Vec::with_capacity(24);
        // Finite floats always serialize.
        let _ = serde_json::to_writer(&mut text, &f);
        buf.push_bytes(&text);
    }
}
