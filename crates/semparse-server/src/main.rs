//! Semparse server - local bridge between the desktop front end and the clustering pipeline.

use anyhow::Result;
use clap::Parser;
use semparse_server::{config, logging, routes, state};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use config::Config;
use logging::{LogArgs, LogConfig};
use state::AppState;

/// Semparse server - collect lines, cluster them, export the grid.
#[derive(Parser, Debug)]
#[command(name = "semparse-server")]
#[command(about = "Local HTTP bridge for the semantic clustering front end")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override port from config
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the clustering engine base URL
    #[arg(long, value_name = "URL")]
    engine_url: Option<String>,

    #[command(flatten)]
    log: LogArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogConfig::from_args(&cli.log));

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(url) = cli.engine_url {
        config.engine_url = url;
    }

    tracing::info!(
        target: "semparse::startup",
        "Loaded configuration (port: {}, engine: {})",
        config.port,
        config.engine_url
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let state = Arc::new(AppState::new(config)?);
    tracing::info!(
        target: "semparse::startup",
        "Session {} ready, exporting to {}",
        state.session.id(),
        state.config.export_dir.display()
    );

    let app = routes::router(state);

    tracing::info!(target: "semparse::startup", "Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
