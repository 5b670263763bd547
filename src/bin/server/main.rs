use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};
use video_storage_proxy::{
    adapters::inbound::http::router::{AppState, create_router},
    config::Configuration,
    create_app, telemetry,
};

#[derive(Parser, Debug)]
#[command(name = "video-storage-proxy")]
#[command(about = "Streams videos to and from an S3-compatible bucket", long_about = None)]
struct Cli {
    /// Server host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    telemetry::init_logging(&cli.log_level)?;

    let config = Configuration::from_env().inspect_err(|e| {
        error!(error = %e, "Invalid configuration, refusing to start");
    })?;

    info!(
        bucket = %config.bucket,
        mode = config.credentials.mode(),
        "Starting video storage proxy"
    );

    let video_store = create_app(config.clone())
        .await
        .context("Failed to build storage backend")?;

    let state = AppState::new(video_store, config.log_tags.clone());
    let readiness = state.readiness.clone();
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", cli.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", cli.host, config.port))?;
    let listener = TcpListener::bind(addr).await.inspect_err(|e| {
        error!(error = %e, %addr, "Failed to bind listener");
    })?;

    readiness.mark_ready();
    info!("Server listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Failed to start server")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
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
                error!(error = %e, "Failed to listen for SIGTERM");
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

    info!("Shutdown signal received");
}
