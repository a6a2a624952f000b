//! Request logging.
//!
//! # Responsibilities
//! - Derive a per-request context carrying `request_id`
//! - Log method, path, query, peer address, headers and body
//! - Hand the handler an intact body
//!
//! # Design Decisions
//! - The body is read in full and restored; only the logged text is cut to
//!   `max_body_bytes`
//! - A failed body read is logged as an error and the event omits `body`;
//!   the stream is already spent, so the handler gets an empty body

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::Extensions;
use axum::middleware::Next;
use axum::response::Response;

use crate::http::headers::redact;
use crate::http::middleware::RequestLogState;
use crate::kv;
use crate::log::value::truncate;
use crate::log::{Arg, LogCtx};

/// Log the incoming request, then pass it on.
pub async fn log_request(State(state): State<RequestLogState>, req: Request, next: Next) -> Response {
    if state.skips(req.uri().path()) {
        return next.run(req).await;
    }

    let base = LogCtx::from_extensions(req.extensions());
    let ctx = state
        .logger
        .with_fields(&base, &kv!["request_id", (state.request_id)()]);

    let (mut parts, body) = req.into_parts();
    parts.extensions.insert(ctx.clone());

    let (ip, port) = remote_addr(&parts.extensions);
    let query = query_map(parts.uri.query());
    let headers = redact(&parts.headers, &state.redact_headers);

    let mut fields = kv![
        "method", parts.method.as_str(),
        "path", parts.uri.path(),
        "query", Arg::json(&query),
        "remote_ip", ip,
        "remote_port", port,
        "headers", Arg::json(&headers),
    ];

    let body = if state.skip_body {
        body
    } else {
        match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => {
                let logged = truncate(&String::from_utf8_lossy(&bytes), state.max_body_bytes).into_owned();
                fields.push(Arg::from("body"));
                fields.push(Arg::from(logged));
                Body::from(bytes)
            }
            Err(e) => {
                state.logger.error(&ctx, "request logger failed to get body", &e, &[]);
                Body::empty()
            }
        }
    };

    state.logger.log(&ctx, state.level, "received request", &fields);
    drop(fields);

    next.run(Request::from_parts(parts, body)).await
}

/// Peer ip and port, empty when the connection info is unknown.
fn remote_addr(extensions: &Extensions) -> (String, String) {
    match extensions.get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => (addr.ip().to_string(), addr.port().to_string()),
        None => (String::new(), String::new()),
    }
}

/// Query parameters grouped by name, values in order of appearance.
fn query_map(query: Option<&str>) -> BTreeMap<String, Vec<String>> {
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            map.entry(key.into_owned()).or_default().push(value.into_owned());
        }
    }
    map
}
