//! Verbose multi-line dumps.

use super::{FormatError, Formatter};
use crate::log::fields::Fields;
use crate::log::msg::LogMsg;

/// The message, then every context field prefixed `ctx `, then every
/// call-site field, one per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugFormatter;

impl Formatter for DebugFormatter {
    fn format(&self, msg: &LogMsg<'_>) -> Result<Vec<u8>, FormatError> {
        let mut buf = Vec::with_capacity(256);

        buf.extend_from_slice(b"msg: ");
        buf.extend_from_slice(msg.msg.as_bytes());
        buf.push(b'\n');

        lines(&mut buf, "ctx ", msg.ctx_fields);
        lines(&mut buf, "", &msg.fields);

        Ok(buf)
    }
}

fn lines(buf: &mut Vec<u8>, prefix: &str, fields: &Fields) {
    for (key, val) in fields {
        buf.extend_from_slice(prefix.as_bytes());
        buf.extend_from_slice(key.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(val.data());
        buf.push(b'\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv;
    use crate::log::format::testing::{fields, msg};
    use crate::log::level::Level;

    #[test]
    fn dumps_every_field() {
        let ctx = fields(&kv!["request_id", "abc"]);
        let flds = fields(&kv!["status", 201, "body", "{}"]);
        let data = DebugFormatter.format(&msg(Level::Info, "sending response", &ctx, flds)).unwrap();

        assert_eq!(
            String::from_utf8(data).unwrap(),
            "msg: sending response\n\
             ctx request_id: \"abc\"\n\
             body: \"{}\"\n\
             status: 201\n"
        );
    }
}
