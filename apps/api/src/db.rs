use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use tracing::info;

use crate::config::PoolSettings;

/// Creates and returns a PostgreSQL connection pool.
///
/// Statements are logged (at sqlx's debug level) only when `echo_sql` is set.
pub async fn create_pool(
    database_url: &str,
    settings: &PoolSettings,
    echo_sql: bool,
) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let mut options =
        PgConnectOptions::from_str(database_url).context("DATABASE_URL is not a valid URL")?;
    if !echo_sql {
        options = options.disable_statement_logging();
    }

    let connect = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .max_lifetime(Duration::from_secs(settings.max_lifetime_secs))
        .test_before_acquire(true)
        .connect_with(options);

    let pool = tokio::time::timeout(Duration::from_secs(settings.connect_timeout_secs), connect)
        .await
        .with_context(|| {
            format!(
                "Timed out connecting to PostgreSQL after {}s",
                settings.connect_timeout_secs
            )
        })?
        .context("Failed to connect to PostgreSQL")?;

    info!(
        "PostgreSQL connection pool established (max {} connections)",
        settings.max_connections
    );
    Ok(pool)
}

/// Creates the `project` table and its status index when they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS project (
            id            BIGINT PRIMARY KEY,
            dapp          VARCHAR(64) NOT NULL DEFAULT 'sexy',
            time          BIGINT NOT NULL DEFAULT 0,
            share_num     BIGINT NOT NULL DEFAULT 0,
            "like"        BIGINT NOT NULL DEFAULT 0,
            launched_like BIGINT NOT NULL DEFAULT 0,
            comment       BIGINT NOT NULL DEFAULT 0,
            status        INTEGER NOT NULL DEFAULT 0,
            created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create project table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS project_status_idx ON project (status)")
        .execute(pool)
        .await
        .context("Failed to create project status index")?;

    info!("Project schema ready");
    Ok(())
}
