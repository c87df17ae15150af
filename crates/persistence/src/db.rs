//! Database connection pool management.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::pg_store::PgStore;

/// Connection pool settings for the PostgreSQL backend.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// Creates a PostgreSQL connection pool with the given settings.
pub async fn create_pool(settings: &PoolSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(settings.idle_timeout_secs))
        .connect(&settings.url)
        .await
}

/// Connects, applies migrations and returns a ready store.
pub async fn connect_store(settings: &PoolSettings) -> Result<PgStore, sqlx::Error> {
    let pool = create_pool(settings).await?;
    let store = PgStore::new(pool);

    tracing::info!("Running database migrations...");
    store.migrate().await?;
    tracing::info!("Migrations completed");

    Ok(store)
}
