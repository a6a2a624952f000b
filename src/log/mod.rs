//! Structured logging engine.
//!
//! # Data Flow
//! ```text
//! call site: logger.info(&ctx, "msg", &kv![...])
//!     → encoder.rs (args → pre-encoded Fields)
//!     → fields.rs  (context snapshot from LogCtx)
//!     → msg.rs     (LogMsg: ts, level, msg, ctx fields, fields)
//!     → format/    (Json | Lite | Debug → bytes)
//!     → logger.rs  (one locked write per line, fallback sink on failure)
//! ```
//!
//! # Design Decisions
//! - Values are encoded once, where they are logged; formatters only splice
//!   ready-made fragments
//! - Contexts are copy-on-write snapshots passed explicitly
//! - Logging never fails its caller

pub mod bridge;
pub mod encoder;
pub mod fields;
pub mod format;
pub mod level;
pub mod logger;
pub mod msg;
pub mod value;

pub use bridge::BridgeLayer;
pub use encoder::{Arg, Attr, Encoder, BAD_KEY};
pub use fields::{Fields, LogCtx, ERROR_KEY};
pub use format::{Format, Formatter};
pub use level::Level;
pub use logger::{LineLogger, Logger};
pub use msg::LogMsg;
pub use value::Value;
