//! borg-recent - Main entry point
//!
//! Serves the most recent Borg archive per repository as JSON.

use anyhow::Result;
use borg_recent::borg::{locate_binary, BorgCli};
use borg_recent::daemon::shutdown::ShutdownCoordinator;
use borg_recent::utils::paths::resolve_root;
use borg_recent::{api, utils, Config, Pipeline};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding one Borg repository per subdirectory (`~/` is expanded)
    #[arg(value_name = "ROOT")]
    root: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config, default 2674)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Path to the borg binary (skips the lookup)
    #[arg(long, value_name = "PATH")]
    borg: Option<PathBuf>,

    /// Don't look for database dumps inside archives
    #[arg(long)]
    no_artifacts: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(level) = args.log_level {
        config.log.level = level;
    }
    if let Some(borg) = args.borg {
        config.borg.binary = Some(borg);
    }
    if args.no_artifacts {
        config.artifacts.enabled = false;
    }

    utils::logger::init(&config.log.level)?;

    tracing::info!("Starting borg-recent v{}", env!("CARGO_PKG_VERSION"));

    let root = resolve_root(&args.root)?;
    let binary = locate_binary(&config.borg.name, config.borg.binary.as_deref())?;
    tracing::info!("Using {} for repositories in {}", binary.display(), root.display());

    let pipeline = Pipeline::from_config(Arc::new(BorgCli::new(binary)), root, &config)?;
    let app = api::create_router_with_state(api::create_app_state(pipeline));

    let addr = SocketAddr::new(config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Recent endpoint: http://{}/recent", addr);

    let coordinator = ShutdownCoordinator::new();
    let mut shutdown_rx = coordinator.subscribe();
    tokio::spawn(async move { coordinator.wait_for_signal().await });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_rx.recv().await.ok();
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
