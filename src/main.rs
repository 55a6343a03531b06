//! dht-http-api server binary.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dht_http_api::{api, Config, LocalNode};

/// HTTP/REST gateway to a DHT node
#[derive(Parser, Debug)]
#[command(name = "dht-http-api")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "DHT_API_CONFIG")]
    config: Option<PathBuf>,
    /// Host to listen on, overrides the configuration
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on, overrides the configuration
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("dht-http-api v{}", env!("CARGO_PKG_VERSION"));

    let mut config =
        Config::load(args.config.as_deref()).context("failed to load configuration")?;

    if let Some(host) = args.host {
        config.http.host = host;
    }
    if let Some(port) = args.port {
        config.http.port = port;
    }

    let node = LocalNode::new(config.node.clone()).context("failed to start dht node")?;

    let listener = TcpListener::bind((config.http.host.as_str(), config.http.port))
        .await
        .with_context(|| {
            format!(
                "failed to bind {}:{}",
                config.http.host, config.http.port
            )
        })?;

    info!(address = %listener.local_addr()?, "HTTP API server started");

    let router = api::create_router(api::AppState::new(config, Arc::new(node.clone())));

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP API server failed")?;

    node.shutdown().await;
    info!("HTTP API server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "Failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }

    info!("Shutting down");
}
