//! Anti-Affinity Server
//!
//! Serves the anti-rule REST API and runs the check daemon that balances
//! region leaders across stores for every anti-rule.
//!
//! Score tables start empty and only the checker writes to them, so a fresh
//! process never builds a transfer: a rule with no scores counts as balanced.

use antiaffinity_scheduler::{
    metrics, AntiRuleChecker, AntiRuleManager, LoggingSink, MemoryCluster, SchedulerConfig,
    Topology, TransferLeaderBuilder,
};
use antiaffinity_server::{router, telemetry, AppState, CheckDaemon};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "antiaffinity-server")]
#[command(about = "Anti-affinity leader balancing service")]
struct Cli {
    /// HTTP listen address
    #[arg(long, env = "ANTI_HTTP_ADDR", default_value = "0.0.0.0:8280")]
    http_addr: SocketAddr,

    /// JSON file describing stores and regions
    #[arg(long, env = "ANTI_TOPOLOGY")]
    topology: Option<PathBuf>,

    /// Check interval in seconds (overrides ANTI_CHECK_INTERVAL_SECS)
    #[arg(long)]
    check_interval: Option<u64>,

    /// Dry run mode (build operators but don't dispatch them)
    #[arg(long, default_value = "false")]
    dry_run: bool,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing(&cli.log_level);
    let metrics_handle = telemetry::init_metrics()?;

    let mut config = SchedulerConfig::from_env()?;
    if let Some(interval) = cli.check_interval {
        config.check_interval_secs = interval;
    }
    config.dry_run |= cli.dry_run;

    info!(
        http = %cli.http_addr,
        topology = ?cli.topology,
        check_interval = config.check_interval_secs,
        tolerance = config.balance_tolerance,
        dry_run = config.dry_run,
        "Starting anti-affinity server"
    );

    let cluster = match cli.topology {
        Some(ref path) => Arc::new(MemoryCluster::from_topology(Topology::from_file(path)?)),
        None => {
            warn!("No topology configured, the check daemon will see no regions");
            Arc::new(MemoryCluster::new())
        }
    };

    let manager = Arc::new(AntiRuleManager::new());
    metrics::set_rule_count(manager.rule_count());
    info!("Anti-scores start empty; rules stay balanced until scores are recorded");

    let checker = Arc::new(AntiRuleChecker::with_tolerance(
        manager.clone(),
        TransferLeaderBuilder::new(cluster.clone()),
        config.balance_tolerance,
    ));
    let daemon = Arc::new(CheckDaemon::new(
        config,
        cluster,
        checker,
        Arc::new(LoggingSink),
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let daemon_handle = daemon.start(shutdown_rx);

    let state = Arc::new(AppState::new(manager));
    let app = router(state).merge(telemetry::routes(metrics_handle));

    let listener = tokio::net::TcpListener::bind(cli.http_addr).await?;
    info!("HTTP server listening on {}", cli.http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    daemon_handle.await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
