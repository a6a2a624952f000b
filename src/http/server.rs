//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the operational handlers
//! - Wire up middleware (timeout, response log, request log, base context)
//! - Bind server to listener with peer address info
//! - Stop accepting on shutdown and drain in-flight requests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;

use crate::config::{AppConfig, ServerConfig};
use crate::http::middleware::{with_logging, RequestLogState};
use crate::kv;
use crate::log::{LineLogger, LogCtx, Logger};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub logger: Arc<LineLogger>,
    pub config: Arc<AppConfig>,
}

/// HTTP server with request/response logging.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a server whose requests log through `logger`, each starting
    /// from the fields in `base`.
    pub fn new(config: AppConfig, logger: Arc<LineLogger>, base: LogCtx) -> Result<Self, regex::Error> {
        let log_state = RequestLogState::from_config(logger.clone(), &config.http)?;
        let state = AppState {
            logger,
            config: Arc::new(config.clone()),
        };

        let router = Self::build_router(&config, state, base, log_state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(config: &AppConfig, state: AppState, base: LogCtx, log_state: RequestLogState) -> Router {
        let router = Router::new()
            .route("/monitor", get(monitor))
            .route("/config", get(show_config))
            .route("/log", get(get_log_level))
            .route("/log/{level}", post(set_log_level))
            .with_state(state)
            .layer(request_timeout(&config.server));

        with_logging(router, base, log_state)
    }

    /// The fully layered router.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server until `shutdown` fires, accepting on `listener`.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Answer 408 when a handler outlives the configured request timeout.
pub fn request_timeout(config: &ServerConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.request_timeout_secs),
    )
}

async fn monitor() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn show_config(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "config": &*state.config }))
}

async fn get_log_level(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "level": state.logger.level() }))
}

async fn set_log_level(
    State(state): State<AppState>,
    Extension(ctx): Extension<LogCtx>,
    Path(level): Path<String>,
) -> Response {
    match state.logger.set_level(&level) {
        Ok(()) => {
            state.logger.info(&ctx, "log level set", &kv!["level", level.as_str()]);
            Json(json!({ "level": state.logger.level() })).into_response()
        }
        Err(e) => (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response(),
    }
}
