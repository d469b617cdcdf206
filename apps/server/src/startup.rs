//! Database pool construction and schema migrations shared by all binaries.

use crate::{config::DatabaseConfig, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_BACKOFF_INITIAL: Duration = Duration::from_secs(1);
const CONNECT_BACKOFF_MAX: Duration = Duration::from_secs(10);

/// Open a connection pool, retrying while the database is still coming up.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let statement_timeout_ms = config.statement_timeout_seconds.saturating_mul(1000);
    let connect_options = PgConnectOptions::from_str(&config.url)?
        .options([("statement_timeout", statement_timeout_ms.to_string())]);

    let mut delay = CONNECT_BACKOFF_INITIAL;
    let mut attempt = 1;
    loop {
        let result = PgPoolOptions::new()
            .min_connections(config.pool_min_size)
            .max_connections(config.pool_max_size)
            .acquire_timeout(Duration::from_secs(config.pool_timeout_seconds))
            .connect_with(connect_options.clone())
            .await;

        match result {
            Ok(pool) => {
                tracing::info!(
                    max_connections = config.pool_max_size,
                    attempt,
                    "Database pool ready"
                );
                return Ok(pool);
            }
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                tracing::warn!(
                    error = %e,
                    attempt,
                    retry_in_ms = delay.as_millis() as u64,
                    "Database connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(CONNECT_BACKOFF_MAX);
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Apply the embedded migrations under `apps/server/migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    tracing::info!("Running database migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Pool plus migrations, honouring `database.run_migrations`.
pub async fn connect_and_migrate(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = connect_pool(config).await?;
    if config.run_migrations {
        run_migrations(&pool).await?;
    }
    Ok(pool)
}
