mod config;
mod db;
mod errors;
mod models;
mod ranking;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::ranking::scoring::ScoreModel;
use crate::ranking::source::PgProjectSource;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing or malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let mut directives = format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            );
            if config.environment.echo_sql() {
                directives.push_str(",sqlx::query=debug");
            }
            EnvFilter::new(directives)
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Project Ranking API v{} ({:?})",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );

    // Initialize PostgreSQL
    let echo_sql = config.environment.echo_sql();
    let db = create_pool(&config.database_url, &config.pool, echo_sql).await?;
    if config.bootstrap_schema {
        ensure_schema(&db).await?;
    }

    let ranking = &config.ranking;
    info!(
        "Ranking mode {:?}, jitter {:?} (fraction {})",
        ranking.score.mode, ranking.jitter, ranking.score.jitter_fraction
    );

    // Build app state
    let state = AppState {
        source: Arc::new(PgProjectSource::new(db)),
        score_model: Arc::new(ScoreModel::new(ranking.score.clone())),
        jitter: ranking.jitter,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
