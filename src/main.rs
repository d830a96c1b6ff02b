use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_rates::{
    api::{create_router, AppState},
    config::Config,
    db::{create_redis_client, Cache, PostgresStore, Store},
    services::{
        providers::{CachedCatalog, JwtIdentityProvider, OmdbProvider},
        CatalogProvider,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_rates=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store = PostgresStore::connect(&config.database_url)
        .await
        .context("Failed to connect to the database")?;
    tracing::info!(backend = store.name(), "Store connected");

    let omdb: Arc<dyn CatalogProvider> = Arc::new(OmdbProvider::new(
        config.omdb_api_url.clone(),
        config.omdb_api_key.clone(),
    ));

    let (catalog, cache_writer) = match &config.redis_url {
        Some(url) => {
            let (cache, handle) = Cache::new(create_redis_client(url)?);
            tracing::info!("Catalog lookups cached in Redis");
            let cached: Arc<dyn CatalogProvider> = Arc::new(CachedCatalog::new(omdb, cache));
            (cached, Some(handle))
        }
        None => (omdb, None),
    };

    let identity = JwtIdentityProvider::new(
        &config.auth0_client_secret,
        config.auth0_secret_base64,
        config.auth0_audience.as_deref(),
        config.auth0_userinfo_url.clone(),
    )
    .context("Failed to configure the identity provider")?;

    let state = AppState::new(
        Arc::new(store),
        catalog,
        Arc::new(identity),
        config.rate_policy,
    );

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        address = %addr,
        rate_policy = ?config.rate_policy,
        "Server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
