//! MediSync blob proxy server.
//!
//! Serves the origin-gated blob API, the fixed-key medicine endpoint,
//! and the token check endpoint over one HTTP listener, backed by a
//! file-based blob store.
//!
//! Usage:
//!   medisync-proxy --port 8888 --data-dir ./medisync-data
//!
//! Origin and token settings come from the environment
//! (`MEDISYNC_ALLOWED_ORIGIN`, `MEDISYNC_AUTH_DOMAIN`,
//! `MEDISYNC_AUTH_AUDIENCE`).

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use medisync_proxy::config::ProxyConfig;
use medisync_proxy::{build_router, ProxyState};
use medisync_store::LocalBlobStore;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "medisync-proxy")]
#[command(about = "MediSync blob proxy and token check server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8888")]
    port: u16,

    /// Directory holding the blob stores
    #[arg(short, long, default_value = "medisync-data")]
    data_dir: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let config = ProxyConfig::from_env();
    info!("MediSync proxy starting...");
    info!("Allowed origin: {}", config.allowed_origin);
    info!("Blob data directory: {:?}", args.data_dir);

    let store = Arc::new(LocalBlobStore::new(&args.data_dir));
    let state = Arc::new(ProxyState::new(store, config));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;
    info!("HTTP API listening on port {}", args.port);
    axum::serve(listener, app).await?;

    Ok(())
}
