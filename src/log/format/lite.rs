//! Human-oriented summary lines.

use std::io::Write;

use chrono::Timelike;

use super::{FormatError, Formatter};
use crate::log::fields::Fields;
use crate::log::level::Level;
use crate::log::msg::LogMsg;

const INDENT: &[u8] = b"                ";

/// `12:30:45.1234 > message | ctx: pairs` followed by one indented line per
/// call-site field, keys sorted, quotes stripped from string values.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteFormatter;

impl Formatter for LiteFormatter {
    fn format(&self, msg: &LogMsg<'_>) -> Result<Vec<u8>, FormatError> {
        let mut buf = Vec::with_capacity(128);

        let sep = if msg.level == Level::Error { "*" } else { ">" };
        let _ = write!(
            buf,
            "{}.{:04} {} {} | ",
            msg.ts.format("%H:%M:%S"),
            msg.ts.nanosecond() % 1_000_000_000 / 100_000,
            sep,
            msg.msg
        );

        for (i, (key, val)) in msg.ctx_fields.iter().enumerate() {
            if i > 0 {
                buf.extend_from_slice(b"  ");
            }
            pair(&mut buf, key, val.display_bytes());
        }
        buf.push(b'\n');

        lines(&mut buf, &msg.fields);
        Ok(buf)
    }
}

fn lines(buf: &mut Vec<u8>, fields: &Fields) {
    for (key, val) in fields {
        buf.extend_from_slice(INDENT);
        pair(buf, key, val.display_bytes());
        buf.push(b'\n');
    }
}

fn pair(buf: &mut Vec<u8>, key: &str, val: &[u8]) {
    buf.extend_from_slice(key.as_bytes());
    buf.extend_from_slice(b": ");
    buf.extend_from_slice(val);
}
