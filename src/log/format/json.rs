//! JSON lines.

use std::collections::BTreeMap;

use chrono::SecondsFormat;
use serde_json::value::RawValue;

use super::{FormatError, Formatter};
use crate::log::msg::LogMsg;
use crate::log::value::Value;

/// One JSON object per line.
///
/// Context fields overwrite call-site fields of the same name, and the
/// reserved `msg`, `level` and `ts` keys overwrite both.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, msg: &LogMsg<'_>) -> Result<Vec<u8>, FormatError> {
        let reserved = [
            ("msg", Value::string(msg.msg)),
            ("level", Value::string(msg.level.as_str())),
            (
                "ts",
                Value::string(&msg.ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ),
        ];

        let mut merged: BTreeMap<&str, &RawValue> = BTreeMap::new();
        for (key, val) in msg.fields.iter().chain(msg.ctx_fields.iter()) {
            merged.insert(key, raw(key, val)?);
        }
        for (key, val) in &reserved {
            merged.insert(key, raw(key, val)?);
        }

        let mut data = serde_json::to_vec(&merged).map_err(FormatError::Marshal)?;
        data.push(b'\n');
        Ok(data)
    }
}

/// Borrow a value as raw JSON, rejecting fragments that are not valid JSON.
fn raw<'v>(key: &str, val: &'v Value) -> Result<&'v RawValue, FormatError> {
    serde_json::from_slice(val.data()).map_err(|source| FormatError::InvalidValue {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv;
    use crate::log::fields::Fields;
    use crate::log::format::testing::{fields, msg};
    use crate::log::level::Level;
    use crate::log::Encoder;

    fn parse(data: &[u8]) -> serde_json::Value {
        serde_json::from_slice(data).unwrap()
    }

    #[test]
    fn renders_one_object_per_line() {
        let ctx = fields(&kv!["request_id", "abc1234"]);
        let flds = fields(&kv!["status", 201, "ok", true]);
        let data = JsonFormatter.format(&msg(Level::Info, "sending response", &ctx, flds)).unwrap();

        assert_eq!(data.last(), Some(&b'\n'));
        assert_eq!(data.iter().filter(|b| **b == b'\n').count(), 1);
        assert_eq!(
            parse(&data),
            serde_json::json!({
                "request_id": "abc1234",
                "status": 201,
                "ok": true,
                "msg": "sending response",
                "level": "info",
                "ts": "2024-03-01T12:30:45Z",
            })
        );
    }

    #[test]
    fn context_wins_over_call_site() {
        let ctx = fields(&kv!["dup", "from ctx"]);
        let flds = fields(&kv!["dup", "from call"]);
        let data = JsonFormatter.format(&msg(Level::Info, "m", &ctx, flds)).unwrap();

        assert_eq!(parse(&data)["dup"], "from ctx");
    }

    #[test]
    fn reserved_keys_win_over_everything() {
        let ctx = fields(&kv!["level", "ctx"]);
        let flds = fields(&kv!["msg", "call", "ts", "call"]);
        let data = JsonFormatter.format(&msg(Level::Error, "real", &ctx, flds)).unwrap();
        let obj = parse(&data);

        assert_eq!(obj["msg"], "real");
        assert_eq!(obj["level"], "error");
        assert_eq!(obj["ts"], "2024-03-01T12:30:45Z");
    }

    #[test]
    fn input_is_not_modified() {
        let ctx = fields(&kv!["a", 1]);
        let flds = fields(&kv!["b", 2]);
        let event = msg(Level::Info, "m", &ctx, flds.clone());
        JsonFormatter.format(&event).unwrap();

        assert_eq!(event.fields, flds);
        assert_eq!(event.ctx_fields.len(), 1);
    }

    #[test]
    fn invalid_fragment_is_an_error() {
        let raw = Encoder { escape: false, ..Encoder::default() };
        let flds = raw.encode(&kv!["obj", crate::log::Arg::json(&serde_json::json!({"one": 55}))]);
        let err = JsonFormatter
            .format(&msg(Level::Info, "m", &Fields::new(), flds))
            .unwrap_err();

        assert!(matches!(err, FormatError::InvalidValue { ref key, .. } if key == "obj"));
    }
}
