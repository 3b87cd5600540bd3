use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;

use api::config::Config;
use api::observability::Observability;
use api::routes;
use api::state::AppState;
use api::store::{BlogStore, MemoryBlogStore, PgBlogStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();
    let config = Config::parse();

    let obs = Observability::init(config.log_format)?;

    let store = open_store(&config).await?;
    let state = AppState::new(store, config.query_timeout(), obs.registry.clone());
    let app = routes::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    obs.shutdown();
    Ok(())
}

async fn open_store(config: &Config) -> Result<Arc<dyn BlogStore>> {
    let Some(dsn) = config.db_dsn.as_deref() else {
        tracing::warn!("no database DSN configured, blogs are kept in memory only");
        return Ok(Arc::new(MemoryBlogStore::new()));
    };

    let connect = PgPoolOptions::new()
        .max_connections(config.db_max_open_conns)
        .idle_timeout(config.db_max_idle_time())
        .acquire_timeout(config.db_connect_timeout())
        .connect(dsn);

    let pool = tokio::time::timeout(config.db_connect_timeout(), connect)
        .await
        .context("timed out connecting to the database")?
        .context("failed to connect to the database")?;

    tracing::info!(
        max_open_conns = config.db_max_open_conns,
        "database connection pool established"
    );
    Ok(Arc::new(PgBlogStore::new(pool)))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down server");
}
