//! Badge Node: entry point.
//!
//! Serves credential verification, issuance and the issuer's `did:web`
//! documents with configuration from a TOML file or defaults.

mod api;
mod config;
mod state;
mod storage;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use config::{BadgeConfig, LoggingConfig};
use state::AppState;

/// Badge Node
#[derive(Parser, Debug)]
#[command(name = "badge-node", version, about = "Open Badges issuer and verifier node")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "badge.toml")]
    config: PathBuf,

    /// Override the API port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the host the node's did:web identifier is built from.
    #[arg(long)]
    did_host: Option<String>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Handle --init flag
    if args.init {
        init_tracing(&LoggingConfig::default());
        let config = BadgeConfig::default();
        config.save(&args.config)?;
        tracing::info!(path = %args.config.display(), "wrote default config");
        return Ok(());
    }

    // Load configuration
    let mut config = BadgeConfig::load(&args.config)?;

    // Apply CLI overrides
    if let Some(api_port) = args.api_port {
        config.api.port = api_port;
    }
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = data_dir;
    }
    if let Some(did_host) = args.did_host {
        config.keys.did_host = did_host;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    init_tracing(&config.logging);
    tracing::info!("Badge Node v{}", env!("CARGO_PKG_VERSION"));

    let state = Arc::new(AppState::from_config(&config).await?);
    tracing::info!(
        did = %state.keys.did(),
        backend = ?config.storage.backend,
        keys = state.keys.list_keys().len(),
        "key store ready"
    );

    let result = api::start_api_server(&config.api_addr(), state.clone(), shutdown_signal()).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "API server error");
    }

    state.keys.close().await?;
    tracing::info!("badge node exited cleanly");
    result
}
