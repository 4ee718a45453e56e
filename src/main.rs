//! Tiercache maintenance entrypoint.
//!
//! Opens the cache described by the environment and either purges expired filesystem
//! records once (`--purge-once`) or keeps sweeping until Ctrl+C / SIGTERM.

use std::sync::Arc;

use mimalloc::MiMalloc;
use tokio::signal;

use tiercache::cache::{Tier, TieredCache};
use tiercache::config::Config;
use tiercache::memory::MokaMemoryTier;
use tiercache::sweeper::ExpirySweeper;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!(
        root = %config.root_dir.display(),
        monitoring = config.monitoring,
        memory_capacity = config.memory_capacity,
        "Tiercache starting"
    );

    let memory = Arc::new(MokaMemoryTier::with_capacity(
        config.memory_capacity,
        Arc::new(tiercache::clock::SystemClock),
    ));
    let cache = Arc::new(TieredCache::new(&config, memory)?);

    if std::env::args().any(|arg| arg == "--purge-once") {
        let evicted = cache.purge_expired(Tier::Filesystem)?;
        tracing::info!(evicted, "Purge complete");
        return Ok(());
    }

    let sweeper = ExpirySweeper::new(Arc::clone(&cache), config.sweep_interval);
    let handle = sweeper.start();

    shutdown_signal().await;

    sweeper.stop();
    if let Err(e) = handle.await {
        tracing::warn!("Sweeper task ended abnormally: {}", e);
    }

    if cache.is_monitoring() {
        match cache.stats() {
            Ok(stats) => tracing::info!(
                keys = stats.per_key.len(),
                most_stored = ?stats.most_stored_key,
                most_fetched = ?stats.most_fetched_key,
                "Session statistics"
            ),
            Err(e) => tracing::warn!("Failed to read statistics: {}", e),
        }
    }

    tracing::info!("Tiercache shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
