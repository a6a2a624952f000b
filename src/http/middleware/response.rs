//! Response logging.
//!
//! # Responsibilities
//! - Buffer the handler's response
//! - Log status, headers, elapsed time and body
//! - Release the buffered response to the client
//!
//! # Design Decisions
//! - The logged body is cut to `max_body_bytes`; the client gets all of it
//! - Elapsed time covers the handler and everything below this layer
//! - If the response cannot be collected or released, the client gets an
//!   empty 500 and the failure is logged against the request's context

use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::http::buffered::Buffered;
use crate::http::headers::redact;
use crate::http::middleware::RequestLogState;
use crate::kv;
use crate::log::value::truncate;
use crate::log::{Arg, LogCtx};

/// Run the handler, log what it produced, then send it.
pub async fn log_response(State(state): State<RequestLogState>, req: Request, next: Next) -> Response {
    if state.skips(req.uri().path()) {
        return next.run(req).await;
    }

    let start = Instant::now();
    let ctx = LogCtx::from_extensions(req.extensions());

    let buffered = match Buffered::capture(next.run(req).await).await {
        Ok(buffered) => buffered,
        Err(e) => {
            state.logger.error(&ctx, "failed to read response", &e, &[]);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let status = buffered.status().map_or(0, |s| s.as_u16());
    let headers = redact(buffered.headers(), &state.redact_headers);

    let mut fields = kv![
        "status", status,
        "headers", Arg::json(&headers),
        "elapsed", start.elapsed(),
    ];
    if !state.skip_body {
        let logged = truncate(&String::from_utf8_lossy(buffered.body()), state.max_body_bytes).into_owned();
        fields.push(Arg::from("body"));
        fields.push(Arg::from(logged));
    }

    state.logger.log(&ctx, state.level, "sending response", &fields);
    drop(fields);

    match buffered.write_response() {
        Ok(response) => response,
        Err(e) => {
            state.logger.error(&ctx, "failed to write response", &e, &[]);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
