//! tickvault-connector: Trade capture binary
//!
//! Subscribes to the FMP crypto websocket and stores each trade event as an
//! individually-keyed JSON object in the configured object store.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tickvault_connector_lib::{
    fmp::{FmpConfig, FmpConnector},
    EnvResolver, KeyResolver, ObjectStoreWriter, Runner, ServerState,
};
use tickvault_metadata::{Environment, Feed, KeyType};

#[derive(Parser, Debug)]
#[command(name = "tickvault-connector")]
#[command(about = "FMP trade capture to object storage")]
struct Args {
    /// Path to feed configuration file
    #[arg(short, long)]
    feed: PathBuf,

    /// Path to environment configuration file
    #[arg(short, long)]
    env: PathBuf,

    /// Health server bind address
    #[arg(long, default_value = "0.0.0.0:8080")]
    health_addr: String,
}

/// Staleness threshold in seconds - if no feed activity for this long, the
/// health check fails
const STALE_THRESHOLD_SECS: u64 = 300;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load feed configuration
    let feed = Feed::load(&args.feed)?;
    info!(feed = %feed.name, "Loaded feed configuration");

    // Load environment configuration
    let env_config = Environment::load(&args.env)?;
    env_config.validate()?;
    info!(env = %env_config.name, "Loaded environment configuration");

    // Setup shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Handle Ctrl+C
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        shutdown_tx_clone.send(true).ok();
    });

    // Parse health server address
    let health_addr: SocketAddr = args.health_addr.parse()?;

    // Resolve the feed credential
    let api_key = resolve_api_key(&env_config)?;

    // Ticker: env var override, otherwise the environment config
    let ticker = std::env::var("FMP_TICKER")
        .unwrap_or_else(|_| env_config.subscription.ticker.clone());

    // Pick the feed version effective today (fall back to latest)
    let today = chrono::Utc::now().date_naive();
    let version = feed
        .get_version_for_date(today)
        .or_else(|| feed.get_latest_version());

    let ws_url = version.map(|v| v.endpoint.clone());
    let insecure_transport = version.map(|v| v.insecure_transport).unwrap_or(false);
    let login_settle =
        Duration::from_millis(version.map(|v| v.login_settle_ms).unwrap_or(1000));

    info!(
        ticker = %ticker,
        endpoint = ws_url.as_deref().unwrap_or("default"),
        insecure_transport,
        "Creating FMP connector"
    );

    let connector = FmpConnector::new(api_key, ticker)
        .with_transport(ws_url, insecure_transport)
        .with_login_settle(login_settle);

    let writer = ObjectStoreWriter::from_config(&env_config.storage)?;

    let mut runner = Runner::new(&feed.name, connector, writer);
    let connected_handle = runner.connected_handle();
    // Activity handle tracks websocket traffic so quiet markets with a live
    // socket do not read as stale.
    let activity_handle = runner.activity_handle();

    // Start health server with staleness tracking
    let server_state = ServerState::new(
        &feed.name,
        Arc::clone(&connected_handle),
        Arc::clone(&activity_handle),
    )
    .with_stale_threshold(STALE_THRESHOLD_SECS);
    tokio::spawn(async move {
        if let Err(e) = tickvault_connector_lib::run_server(health_addr, server_state).await {
            error!(error = %e, "Health server error");
        }
    });
    info!(addr = %health_addr, stale_threshold_secs = STALE_THRESHOLD_SECS, "Health server started");

    // Run the pipeline
    match runner.run(shutdown_rx).await {
        Ok(()) => {
            info!("Capture pipeline stopped gracefully");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Capture pipeline error");
            std::process::exit(1);
        }
    }
}

/// Resolve the FMP API key: environment config key specs first, falling
/// back to the FMP_API_KEY environment variable.
fn resolve_api_key(env_config: &Environment) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(ref keys) = env_config.keys {
        let api_key_spec = keys.values().find(|k| k.key_type == KeyType::ApiKey);

        if let Some(key_spec) = api_key_spec {
            if let Some(ref source) = key_spec.source {
                let resolver = EnvResolver::new();
                let api_key = resolver.resolve(source).map_err(|e| {
                    error!(error = %e, source = %source, "Failed to resolve credential from env config");
                    e
                })?;
                info!("Loaded credential from env config keys");
                return Ok(api_key);
            }
        }
    }

    info!("No key source in env config, falling back to FMP_API_KEY");
    Ok(FmpConfig::from_env()?.api_key)
}
