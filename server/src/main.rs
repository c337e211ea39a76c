//! Storefront server: loads config from env, prepares the store, serves the catalog API.
//!
//! Run from repo root: `cargo run -p storefront-server`

use std::sync::Arc;
use storefront_api::{
    build_app, ensure_database_exists, telemetry, AppConfig, AppError, AppState, CatalogService, MemoryStore,
    PgStore, Store, StoreKind,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    telemetry::init_tracing(telemetry::DEFAULT_LOG_FILTER);

    let store: Arc<dyn Store> = match config.store {
        StoreKind::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or("DATABASE_URL is required for the postgres store")?;
            ensure_database_exists(database_url).await?;
            let store = PgStore::connect(database_url, &config.schema, config.max_connections).await?;
            store.migrate().await?;
            Arc::new(store)
        }
        StoreKind::Memory => {
            tracing::warn!("using in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    if let Some(seed) = &config.seed_user {
        match CatalogService::register_user(store.as_ref(), &seed.username, &seed.password).await {
            Ok(_) => {}
            Err(AppError::Conflict(_)) => tracing::info!(username = %seed.username, "seed user already exists"),
            Err(e) => return Err(e.into()),
        }
    }

    let app = build_app(AppState::new(store), config.body_limit_bytes);
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
