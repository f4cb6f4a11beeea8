//! Wallet Hunter — entry point.
//!
//! Loads configuration, initialises structured logging, builds the single
//! hunter instance and serves the control API until Ctrl+C. With the
//! dashboard disabled the hunter starts immediately instead.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use wallet_hunter::config::{self, AppConfig};
use wallet_hunter::dashboard;
use wallet_hunter::engine::stats::Statistics;
use wallet_hunter::engine::worker::Hunter;

const BANNER: &str = r#"
 __        __    _ _      _     _   _             _
 \ \      / /_ _| | | ___| |_  | | | |_   _ _ __ | |_ ___ _ __
  \ \ /\ / / _` | | |/ _ \ __| | |_| | | | | '_ \| __/ _ \ '__|
   \ V  V / (_| | | |  __/ |_  |  _  | |_| | | | | ||  __/ |
    \_/\_/ \__,_|_|_|\___|\__| |_| |_|\__,_|_| |_|\__\___|_|

  v0.1.0 — polling worker
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path =
        std::env::var("HUNTER_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = AppConfig::load_or_default(&config_path)?;

    println!("{BANNER}");
    info!(
        config = %config_path,
        interval_ms = cfg.hunter.interval_ms,
        hit_threshold = cfg.hunter.hit_threshold,
        empty_probability = cfg.oracle.empty_probability,
        rpc_timeout_ms = cfg.oracle.rpc_timeout_ms,
        "Wallet Hunter starting up"
    );
    if cfg.oracle.uses_public_endpoint() {
        info!(url = config::PUBLIC_RPC_URL, "No RPC key configured, using public endpoint");
    }
    if cfg.oracle.simulation.enabled {
        warn!("Simulation enabled: reported hits are NOT genuine ledger results");
    }

    // One statistics block and one worker for the whole process
    let stats = Arc::new(Statistics::new());
    let hunter = Arc::new(Hunter::from_config(&cfg, stats)?);

    if cfg.server.enabled {
        dashboard::serve(hunter.clone(), cfg.server.port, shutdown_signal()).await?;
    } else {
        info!("Dashboard disabled, starting hunter directly. Press Ctrl+C to stop.");
        hunter.start();
        shutdown_signal().await;
    }

    hunter.stop();
    let snapshot = hunter.snapshot();
    info!(
        checked = snapshot.checked,
        hits = snapshot.hits,
        uptime_secs = format!("{:.1}", snapshot.uptime),
        "Wallet Hunter shut down cleanly."
    );

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wallet_hunter=info"));

    let json_logging = std::env::var("HUNTER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
