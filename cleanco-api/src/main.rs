use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use cleanco_api::{app, AppState, AuthConfig};
use cleanco_core::{DocumentStore, SERVICES_COLLECTION};
use cleanco_store::{app_config::Config, DbClient, InMemoryStore, PgDocumentStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cleanco_api=debug,cleanco_core=debug,cleanco_store=debug,tower_http=debug,axum::rejection=trace"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("failed to load config")?;
    tracing::info!("Starting Clean Co API on port {}", config.server.port);

    let store = connect_store(&config).await?;

    let state = AppState::new(
        store,
        AuthConfig {
            secret: config.auth.access_token_secret.clone(),
            expiration: config.auth.token_expiration_seconds,
        },
    )
    .with_allowed_origins(config.cors.allowed_origins.clone());

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Clean co running on http://localhost:{}", config.server.port);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    if let Some(url) = &config.database.url {
        let db = DbClient::new(url, config.database.max_connections)
            .await
            .context("failed to connect to Postgres")?;
        db.migrate().await.context("failed to run migrations")?;
        tracing::info!("Using Postgres document store");
        return Ok(Arc::new(PgDocumentStore::new(db.pool)));
    }

    tracing::warn!("No database.url configured; using in-memory document store");
    let memory = InMemoryStore::new();
    if let Some(path) = &config.catalog.seed_path {
        if let Err(e) = memory.seed_from_file(SERVICES_COLLECTION, path).await {
            tracing::warn!(error = %e, "service catalog not seeded");
        }
    }
    Ok(Arc::new(memory))
}
