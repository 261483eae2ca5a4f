//! Connection pool setup.

use anyhow::Context;
use photodrop_core::Config;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Open a connection pool sized from configuration.
pub async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to metadata database")?;

    tracing::info!(
        max_connections = config.db_max_connections,
        "Connected to metadata database"
    );

    Ok(pool)
}

/// Apply embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run metadata database migrations")?;
    Ok(())
}
