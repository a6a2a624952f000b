//! Structured, context-scoped logging for HTTP services.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ replace_ctx ─▶ log_request ─▶ log_response ─▶ handler
//!                      (base ctx)     (request_id,    (Buffered)
//!                                      request event)      │
//!                                           │              │ response event
//!                                           ▼              ▼
//!                                  ┌──────────────────────────────────┐
//!                                  │ LineLogger                        │
//!                                  │  Encoder → Fields → Formatter →   │
//!                                  │  writer (alt writer on failure)   │
//!                                  └──────────────────────────────────┘
//!                                           ▲
//!                                  tracing events via BridgeLayer
//! ```
//!
//! # Subsystems
//! - `log`: value encoding, context fields, formatters, the line logger
//! - `http`: response buffering, header redaction, middleware, server
//! - `config`: TOML configuration with validation
//! - `lifecycle`: shutdown coordination and signal handling

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod log;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use log::{Arg, LineLogger, LogCtx, Logger};
