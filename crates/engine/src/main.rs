use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use domain::store::PersistenceStore;
use persistence::{InMemoryStore, PgStore};
use sitetrack_engine::config::{Config, StorageBackend};
use sitetrack_engine::geocoding::NominatimAddressResolver;
use sitetrack_engine::{logging, metrics, TrackingEngine};

/// How often connection pool gauges are refreshed.
const POOL_METRICS_PERIOD: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    logging::init_logging(&config.logging)?;

    info!("Starting site tracking engine v{}", env!("CARGO_PKG_VERSION"));

    if config.metrics.enabled {
        let addr = config.metrics_addr()?;
        metrics::init_metrics(addr).context("Failed to install Prometheus exporter")?;
        info!("Metrics exporter listening on {}", addr);
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut background: Vec<JoinHandle<()>> = Vec::new();

    let store: Arc<dyn PersistenceStore> = match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on exit");
            Arc::new(InMemoryStore::new())
        }
        StorageBackend::Postgres => {
            let store = Arc::new(
                persistence::db::connect_store(&config.storage.pool_settings())
                    .await
                    .context("Failed to connect to database")?,
            );
            background.push(spawn_pool_metrics(Arc::clone(&store), shutdown_rx.clone()));
            store
        }
    };

    let mut builder = TrackingEngine::builder()
        .store(store)
        .settings(config.tracking.clone());
    if config.geocoding.enabled {
        let resolver = NominatimAddressResolver::new(config.geocoding.clone())
            .context("Failed to build geocoding client")?;
        builder = builder.address_resolver(Arc::new(resolver));
        info!("Reverse geocoding enabled ({})", config.geocoding.url);
    }
    let engine = builder.build()?;

    let resumed = engine.resume_tracking().await?;
    info!(resumed, "Tracking engine ready");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    engine.shutdown().await;
    let _ = shutdown_tx.send(true);
    for handle in background {
        if let Err(e) = handle.await {
            warn!("Background task panicked: {}", e);
        }
    }

    info!("Tracking engine stopped");
    Ok(())
}

fn spawn_pool_metrics(store: Arc<PgStore>, mut shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(POOL_METRICS_PERIOD);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    persistence::metrics::record_pool_metrics(store.pool());
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    })
}
