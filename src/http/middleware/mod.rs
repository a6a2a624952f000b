//! Request/response logging middleware.
//!
//! # Data Flow
//! ```text
//! Request
//!     → context.rs   (install the base LogCtx)
//!     → request.rs   (request_id child ctx, "received request" event)
//!     → response.rs  (buffer handler output, "sending response" event)
//!     → handler
//! ```
//!
//! # Design Decisions
//! - All three layers share one `RequestLogState`, cloned per layer
//! - Context travels in request extensions, never in globals
//! - A path matching the skip pattern bypasses both logging layers

pub mod context;
pub mod request;
pub mod request_id;
pub mod response;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::Router;
use regex::Regex;

use crate::config::{HttpLogConfig, RequestIdStyle};
use crate::log::{Level, LogCtx, Logger};

pub use context::replace_ctx;
pub use request::log_request;
pub use request_id::{short_id, uuid_id, RequestIdFn};
pub use response::log_response;

/// Shared settings for the logging layers.
#[derive(Clone)]
pub struct RequestLogState {
    pub logger: Arc<dyn Logger>,
    /// Canonical header names whose values are replaced.
    pub redact_headers: Arc<HashSet<String>>,
    pub skip_body: bool,
    pub skip_pattern: Option<Regex>,
    /// Longest body text kept in an event; handlers always get the whole body.
    pub max_body_bytes: usize,
    /// Level of the request and response events.
    pub level: Level,
    pub request_id: RequestIdFn,
}

impl RequestLogState {
    /// Defaults: no redaction, bodies logged, trace-level events, short
    /// request ids.
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            logger,
            redact_headers: Arc::new(HashSet::new()),
            skip_body: false,
            skip_pattern: None,
            max_body_bytes: 1024 * 1024,
            level: Level::Trace,
            request_id: Arc::new(short_id),
        }
    }

    pub fn from_config(logger: Arc<dyn Logger>, config: &HttpLogConfig) -> Result<Self, regex::Error> {
        let skip_pattern = config.skip_pattern.as_deref().map(Regex::new).transpose()?;
        let request_id: RequestIdFn = match config.request_id {
            RequestIdStyle::Short => Arc::new(short_id),
            RequestIdStyle::Uuid => Arc::new(uuid_id),
        };

        Ok(Self {
            logger,
            redact_headers: Arc::new(config.redact_headers.iter().cloned().collect()),
            skip_body: config.skip_body,
            skip_pattern,
            max_body_bytes: config.max_body_bytes,
            level: config.level,
            request_id,
        })
    }

    pub fn with_redact_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.redact_headers = Arc::new(headers.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_skip_body(mut self, skip: bool) -> Self {
        self.skip_body = skip;
        self
    }

    pub fn with_skip_pattern(mut self, pattern: Regex) -> Self {
        self.skip_pattern = Some(pattern);
        self
    }

    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_request_id(mut self, f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.request_id = Arc::new(f);
        self
    }

    /// Whether logging is bypassed for `path`.
    pub fn skips(&self, path: &str) -> bool {
        self.skip_pattern.as_ref().is_some_and(|re| re.is_match(path))
    }
}

impl fmt::Debug for RequestLogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLogState")
            .field("redact_headers", &self.redact_headers)
            .field("skip_body", &self.skip_body)
            .field("skip_pattern", &self.skip_pattern.as_ref().map(Regex::as_str))
            .field("max_body_bytes", &self.max_body_bytes)
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

/// Wrap `router` as replace_ctx(log_request(log_response(handler))).
pub fn with_logging<S>(router: Router<S>, base: LogCtx, state: RequestLogState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(from_fn_with_state(state.clone(), log_response))
        .layer(from_fn_with_state(state, log_request))
        .layer(from_fn_with_state(base, replace_ctx))
}
