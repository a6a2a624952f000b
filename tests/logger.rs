//! Logger behavior as seen by library users.

use fieldlog::kv;
use fieldlog::log::format::LiteFormatter;
use fieldlog::log::{Arg, Attr, Encoder, LineLogger, LogCtx, Logger};

mod common;

use common::{capture_logger, Broken, Capture};

#[derive(Debug, thiserror::Error)]
#[error("connection refused")]
struct Refused;

#[derive(Debug, thiserror::Error)]
#[error("failed to fetch quote")]
struct Fetch(#[source] Refused);

#[test]
fn context_tree_isolates_siblings() {
    let (logger, capture) = capture_logger();

    let root = logger.with_fields(&LogCtx::new(), &kv!["app_id", "demo"]);
    let left = logger.with_fields(&root, &kv!["request_id", "left"]);
    let right = logger.with_fields(&root, &kv!["request_id", "right", "user", "ima"]);

    logger.info(&left, "one", &[]);
    logger.info(&right, "two", &[]);
    logger.info(&root, "three", &[]);

    let events = capture.events();
    assert_eq!(events[0]["request_id"], "left");
    assert!(events[0].get("user").is_none());
    assert_eq!(events[1]["request_id"], "right");
    assert_eq!(events[1]["user"], "ima");
    assert!(events[2].get("request_id").is_none());
    assert!(events.iter().all(|e| e["app_id"] == "demo"));
}

#[test]
fn error_event_carries_chain() {
    let (logger, capture) = capture_logger();

    logger.error(&LogCtx::new(), "quote failed", &Fetch(Refused), &kv!["symbol", "ACME"]);

    let event = &capture.events()[0];
    assert_eq!(event["level"], "error");
    assert_eq!(event["error"], "failed to fetch quote: connection refused");
    assert_eq!(event["symbol"], "ACME");
}

#[test]
fn bad_argument_lists_are_reported() {
    let (logger, capture) = capture_logger();

    logger.info(&LogCtx::new(), "odd", &kv!["key", "value", "dangling"]);
    logger.info(&LogCtx::new(), "attr", &[Arg::from(Attr::new("port", 8080)), Arg::from(42)]);

    let events = capture.events();
    assert_eq!(events[0]["key"], "value");
    assert_eq!(events[0]["!BADKEY"], "dangling");
    assert_eq!(events[1]["port"], 8080);
    assert_eq!(events[1]["!BADKEY"], 42);
}

#[test]
fn structured_values_are_escaped_strings() {
    let (logger, capture) = capture_logger();

    logger.info(&LogCtx::new(), "m", &kv!["obj", Arg::json(&serde_json::json!({"a": [1, 2]}))]);

    assert_eq!(capture.events()[0]["obj"], r#"{"a":[1,2]}"#);
}

#[test]
fn long_values_are_truncated() {
    let capture = Capture::default();
    let logger = LineLogger::new()
        .with_writer(capture.clone())
        .with_encoder(Encoder { escape: true, max_len: 5 });

    logger.info(&LogCtx::new(), "m", &kv!["body", "abcdefghij"]);

    assert_eq!(capture.events()[0]["body"], "abcde--truncated--");
}

#[test]
fn write_failure_reaches_alt_writer() {
    let alt = Capture::default();
    let logger = LineLogger::new()
        .with_writer(Broken)
        .with_alt_writer(alt.clone());

    logger.info(&LogCtx::new(), "lost", &[]);

    let lines = alt.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("logerror: failed to write: sink closed with line: "));
    assert!(lines[0].contains(r#""msg":"lost""#));
}

#[test]
fn lite_lines_are_human_readable() {
    let capture = Capture::default();
    let logger = LineLogger::new()
        .with_writer(capture.clone())
        .with_formatter(Box::new(LiteFormatter));
    let ctx = logger.with_fields(&LogCtx::new(), &kv!["request_id", "abc1234"]);

    logger.info(&ctx, "sending response", &kv!["status", 201]);

    let lines = capture.lines();
    assert!(lines[0].contains(" > sending response | request_id: abc1234"));
    assert_eq!(lines[1], format!("{}status: 201", " ".repeat(16)));
}
