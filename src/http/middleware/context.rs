//! Base context installation.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::log::LogCtx;

/// Replace the request's log context with `base`.
pub async fn replace_ctx(State(base): State<LogCtx>, mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(base);
    next.run(req).await
}
