use anyhow::{bail, Context, Result};
use favicon_tools::{FaviconGenerator, GeneratorConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod routes;

use config::HostConfig;
use routes::{build_router, AppState};

/// Environment variable holding the log filter directives
const LOG_ENV: &str = "FAVICON_LOG";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    bind: Option<SocketAddr>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().context("--config requires a path")?;
                parsed.config = Some(PathBuf::from(value));
            }
            "--bind" => {
                let value = args.next().context("--bind requires an address")?;
                let addr = value
                    .parse::<SocketAddr>()
                    .with_context(|| format!("invalid --bind address {:?}", value))?;
                parsed.bind = Some(addr);
            }
            other => bail!("unknown argument {:?} (expected --config <path> or --bind <addr>)", other),
        }
    }
    Ok(parsed)
}

fn init_tracing() {
    // FAVICON_LOG holds the filter directives, default "info"
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received, draining connections");
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = parse_args(std::env::args().skip(1))?;
    let mut config = HostConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    let state = AppState::new(FaviconGenerator::new(GeneratorConfig::default()));
    let app = build_router(state, &config.server);

    let listener = tokio::net::TcpListener::bind(config.server.bind)
        .await
        .with_context(|| format!("binding {}", config.server.bind))?;
    info!(
        addr = %config.server.bind,
        route = %config.server.route,
        max_upload_bytes = config.server.max_upload_bytes,
        "favicon-host listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("favicon-host stopped");
    Ok(())
}
