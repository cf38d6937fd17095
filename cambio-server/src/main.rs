//! Cambio checkout host
//!
//! Serves the P2P exchange checkout: rates, the three-step form, proof
//! upload, order registration and the messaging hand-off.

mod adapters;
mod api;
mod config;
mod server;
mod shutdown;
mod state;

use adapters::{HttpOrderService, HttpRateProvider, LocalRewardLedger};
use cambio_core::checkout::CheckoutDeps;
use cambio_core::clock::SystemClock;
use cambio_core::entities::rate::RateSnapshot;
use cambio_core::processors::RatePoller;
use cambio_core::rates::RateBoard;
use cambio_core::store::{FileSessionStore, Recovery};
use clap::Parser;
use config::ConfigLoader;
use server::{build_router, run_server};
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Cambio - P2P currency exchange checkout host
#[derive(Parser, Debug)]
#[command(name = "cambio-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./cambio-config.toml", env = "CAMBIO_CONFIG")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Emit logs as JSON lines
    #[arg(long, default_value = "false")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(args.log_json);

    tracing::info!("Starting cambio-server v{}", env!("CARGO_PKG_VERSION"));

    let config_loader = ConfigLoader::new(&args.config, args.listen);
    let config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let clock = Arc::new(SystemClock);

    // Rates refresh in the background; the first refresh runs immediately.
    let board = RateBoard::new(RateSnapshot::empty());
    let poller = RatePoller::new(
        Arc::new(HttpRateProvider::new(&config.services)),
        board.clone(),
        clock.clone(),
        config.rates.clone(),
    );
    let poller_handle = tokio::spawn(poller.run(shutdown_rx));

    let deps = CheckoutDeps {
        store: Arc::new(FileSessionStore::new(&config.server.session_dir)),
        clock,
        orders: Arc::new(HttpOrderService::new(&config.services)),
        rewards: Arc::new(LocalRewardLedger::new(&config.ads)),
        rates: board,
        config: config.checkout.clone(),
        handoff: config.handoff.clone(),
    };
    let state = AppState::new(deps);

    match state.inspect_recovery().await {
        Ok(Recovery::AutoResume(session)) => {
            tracing::info!(step = session.step.number(), "Resumed checkout at payment step");
        }
        Ok(Recovery::Offer(session)) => {
            tracing::info!(step = session.step.number(), "Stored checkout available for recovery");
        }
        Ok(Recovery::Nothing) => {}
        Err(e) => tracing::warn!("Failed to inspect stored checkout: {}", e),
    }

    let router = build_router(state.clone());

    tracing::info!("Starting HTTP server on {}", config.server.listen);
    let result = run_server(router, config.server.listen).await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = poller_handle.await {
        tracing::warn!("Rate poller task failed: {}", e);
    }
    state.shutdown().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
