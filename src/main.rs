use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fieldlog::config::{load_config, AppConfig};
use fieldlog::http::middleware::short_id;
use fieldlog::http::HttpServer;
use fieldlog::kv;
use fieldlog::lifecycle::{wait_for_signal, Shutdown};
use fieldlog::log::{BridgeLayer, LineLogger, LogCtx, Logger};

/// HTTP service with structured request and response logging.
#[derive(Debug, Parser)]
#[command(name = "fieldlog", version)]
struct Args {
    /// Path to a TOML config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    let logger = Arc::new(LineLogger::from_config(&config.logging));
    let base = logger.with_fields(&LogCtx::new(), &kv!["app_id", "fieldlog", "run_id", short_id()]);

    // Framework diagnostics go through the same logger.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldlog=info,tower_http=info".into()),
        )
        .with(BridgeLayer::new(logger.clone()).with_ctx(base.clone()))
        .init();

    logger.info(
        &base,
        "starting",
        &kv![
            "version", env!("CARGO_PKG_VERSION"),
            "bind_address", config.server.bind_address.as_str(),
            "level", logger.level().as_str(),
        ],
    );

    let listener = TcpListener::bind(&config.server.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signals = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { wait_for_signal(&shutdown).await })
    };

    let server = HttpServer::new(config, logger.clone(), base.clone())?;
    server.run(listener, server_shutdown).await?;
    signals.abort();

    logger.info(&base, "stopped", &[]);
    Ok(())
}
