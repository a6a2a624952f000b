//! The logging core.
//!
//! # Responsibilities
//! - Define the `Logger` contract consumed by middleware and handlers
//! - Build a `LogMsg` per call, format it, and write it to the sink
//! - Absorb every failure: formatting falls back to a plain line, and a
//!   failed write is reported to the fallback sink if there is one
//!
//! # Design Decisions
//! - Each sink sits behind its own mutex and receives exactly one
//!   `write_all` per line, so concurrent requests never interleave bytes
//! - The level threshold is atomic and can change while serving

use std::error::Error;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use crate::config::{AltWriter, LoggingConfig};
use crate::log::encoder::{Arg, Encoder};
use crate::log::fields::{LogCtx, ERROR_KEY};
use crate::log::format::{Formatter, JsonFormatter};
use crate::log::level::{AtomicLevel, Level, LevelError};
use crate::log::msg::LogMsg;
use crate::log::value::Value;

/// Logging interface for request handling code.
///
/// `kv` is an alternating key/value list, usually built with [`kv!`](crate::kv).
pub trait Logger: Send + Sync {
    /// Log at an arbitrary non-error level.
    fn log(&self, ctx: &LogCtx, level: Level, msg: &str, kv: &[Arg<'_>]);

    fn info(&self, ctx: &LogCtx, msg: &str, kv: &[Arg<'_>]) {
        self.log(ctx, Level::Info, msg, kv);
    }

    fn debug(&self, ctx: &LogCtx, msg: &str, kv: &[Arg<'_>]) {
        self.log(ctx, Level::Debug, msg, kv);
    }

    fn trace(&self, ctx: &LogCtx, msg: &str, kv: &[Arg<'_>]) {
        self.log(ctx, Level::Trace, msg, kv);
    }

    /// Log at error level with the full error chain under `error`.
    fn error(&self, ctx: &LogCtx, msg: &str, err: &dyn Error, kv: &[Arg<'_>]);

    /// Derive a context carrying `kv` on top of the fields already in `ctx`.
    fn with_fields(&self, ctx: &LogCtx, kv: &[Arg<'_>]) -> LogCtx;
}

/// Render an error and all of its sources as `outer: inner: root`.
pub fn error_chain(err: &dyn Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// A writer guarded for whole-line writes.
struct Sink(Mutex<Box<dyn Write + Send>>);

impl Sink {
    fn new(writer: impl Write + Send + 'static) -> Self {
        Self(Mutex::new(Box::new(writer)))
    }

    fn write_line(&self, line: &[u8]) -> io::Result<()> {
        // A panic mid-write elsewhere must not silence logging.
        let mut writer = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(line)?;
        writer.flush()
    }
}

/// Logger writing one formatted line per event.
pub struct LineLogger {
    writer: Sink,
    alt_writer: Option<Sink>,
    formatter: Box<dyn Formatter>,
    encoder: Encoder,
    level: AtomicLevel,
}

impl LineLogger {
    /// JSON lines to stdout, failures reported to stderr.
    pub fn new() -> Self {
        Self {
            writer: Sink::new(io::stdout()),
            alt_writer: Some(Sink::new(io::stderr())),
            formatter: Box::new(JsonFormatter),
            encoder: Encoder::default(),
            level: AtomicLevel::new(Level::Info),
        }
    }

    /// Build a stdout logger from configuration.
    pub fn from_config(config: &LoggingConfig) -> Self {
        let logger = Self::new()
            .with_formatter(config.format.formatter())
            .with_encoder(Encoder {
                escape: config.escape,
                max_len: config.max_len,
            })
            .with_level(config.level);

        match config.alt_writer {
            AltWriter::Stderr => logger,
            AltWriter::None => logger.without_alt_writer(),
        }
    }

    pub fn with_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.writer = Sink::new(writer);
        self
    }

    pub fn with_alt_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.alt_writer = Some(Sink::new(writer));
        self
    }

    pub fn without_alt_writer(mut self) -> Self {
        self.alt_writer = None;
        self
    }

    pub fn with_formatter(mut self, formatter: Box<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_encoder(mut self, encoder: Encoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_level(self, level: Level) -> Self {
        self.level.set(level);
        self
    }

    pub fn level(&self) -> Level {
        self.level.get()
    }

    /// Change the threshold by name.
    pub fn set_level(&self, name: &str) -> Result<(), LevelError> {
        self.level.set(name.parse()?);
        Ok(())
    }

    fn emit(&self, ctx: &LogCtx, level: Level, msg: &str, err: Option<&dyn Error>, kv: &[Arg<'_>]) {
        if !self.level.enabled(level) {
            return;
        }

        let mut fields = self.encoder.encode(kv);
        if let Some(err) = err {
            fields.insert("error", Value::string(&error_chain(err)));
        }

        let event = LogMsg {
            ts: Utc::now(),
            level,
            msg,
            ctx_fields: ctx.get_fields(),
            fields,
        };

        let line = match self.formatter.format(&event) {
            Ok(line) => line,
            Err(e) => format!(
                "{}: {} with level: {} msg: {}\n",
                ERROR_KEY,
                error_chain(&e),
                level,
                msg
            )
            .into_bytes(),
        };

        if let Err(e) = self.writer.write_line(&line) {
            if let Some(alt) = &self.alt_writer {
                let diag = format!(
                    "{}: failed to write: {} with line: {}\n",
                    ERROR_KEY,
                    e,
                    String::from_utf8_lossy(&line).trim_end()
                );
                let _ = alt.write_line(diag.as_bytes());
            }
        }
    }
}

impl Default for LineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LineLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineLogger")
            .field("formatter", &self.formatter)
            .field("encoder", &self.encoder)
            .field("level", &self.level.get())
            .field("alt_writer", &self.alt_writer.is_some())
            .finish_non_exhaustive()
    }
}

impl Logger for LineLogger {
    fn log(&self, ctx: &LogCtx, level: Level, msg: &str, kv: &[Arg<'_>]) {
        self.emit(ctx, level, msg, None, kv);
    }

    fn error(&self, ctx: &LogCtx, msg: &str, err: &dyn Error, kv: &[Arg<'_>]) {
        self.emit(ctx, Level::Error, msg, Some(err), kv);
    }

    fn with_fields(&self, ctx: &LogCtx, kv: &[Arg<'_>]) -> LogCtx {
        ctx.with_fields(self.encoder.encode(kv))
    }
}
