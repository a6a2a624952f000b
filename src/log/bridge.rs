//! Routes `tracing` events through a [`LineLogger`].
//!
//! Framework and server diagnostics are emitted with `tracing` macros; this
//! layer renders them with the same formatter and sink as request logs.

use std::error::Error;
use std::fmt::Debug;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::log::encoder::{Arg, Attr};
use crate::log::fields::LogCtx;
use crate::log::level::Level;
use crate::log::logger::{error_chain, LineLogger, Logger};

/// A `tracing_subscriber` layer writing every event it sees as a log line.
#[derive(Debug, Clone)]
pub struct BridgeLayer {
    logger: Arc<LineLogger>,
    ctx: LogCtx,
}

impl BridgeLayer {
    pub fn new(logger: Arc<LineLogger>) -> Self {
        Self {
            logger,
            ctx: LogCtx::new(),
        }
    }

    /// Attach fields (e.g. the application name) to every bridged event.
    pub fn with_ctx(mut self, ctx: LogCtx) -> Self {
        self.ctx = ctx;
        self
    }
}

impl<S: Subscriber> Layer<S> for BridgeLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let mut visitor = ArgVisitor::default();
        event.record(&mut visitor);

        visitor.args.push(Attr::new("target", meta.target()).into());
        let msg = visitor.message.unwrap_or_default();

        self.logger
            .log(&self.ctx, Level::from(meta.level()), &msg, &visitor.args);
    }
}

#[derive(Default)]
struct ArgVisitor {
    message: Option<String>,
    args: Vec<Arg<'static>>,
}

impl ArgVisitor {
    fn push(&mut self, field: &Field, value: impl Into<Arg<'static>>) {
        self.args.push(Attr::new(field.name(), value).into());
    }
}

impl Visit for ArgVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.push(field, value.to_string());
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, value);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        self.push(field, error_chain(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        let text = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(text);
        } else {
            self.push(field, text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::Mutex;
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn tracing_events_become_log_lines() {
        let out = Capture::default();
        let logger = Arc::new(LineLogger::new().with_writer(out.clone()));
        let subscriber = tracing_subscriber::registry().with(BridgeLayer::new(logger));

        tracing::subscriber::with_default(subscriber, || {
            let addr = "127.0.0.1:8080";
            tracing::info!(address = %addr, connections = 3_u64, "Listening");
            tracing::debug!("below threshold");
        });

        let text = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 1);

        let obj: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(obj["msg"], "Listening");
        assert_eq!(obj["address"], "127.0.0.1:8080");
        assert_eq!(obj["connections"], 3);
        assert_eq!(obj["target"], "fieldlog::log::bridge::tests");
    }
}
