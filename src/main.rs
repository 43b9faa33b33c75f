//! Agro Catalog - commodity catalog back office service

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agro_catalog::{
    access::CatalogAccess,
    api::{self, AppState},
    assets::LocalAssetStore,
    bus::EventBus,
    config::Config,
    providers::Catalog,
    relay,
    store::{DocumentStore, MemoryStore, PgStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
            let store = PgStore::new(pool, &config.project_id);
            store.migrate().await?;
            tracing::info!(project = %config.project_id, "using postgres document store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, catalog is kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };
    let assets = LocalAssetStore::new(&config.asset_root, &config.asset_account, &config.asset_public_url);
    tokio::fs::create_dir_all(assets.root()).await?;

    let bus = EventBus::new();
    let _relay = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(relay::spawn(&bus, client)),
            Err(e) => {
                tracing::warn!(error = %e, "nats unavailable, catalog events stay in-process");
                None
            }
        },
        None => None,
    };

    let catalog = Catalog::new(CatalogAccess::new(store, Arc::new(assets)), bus);
    if let Err(e) = catalog.load().await {
        tracing::warn!(error = %e, "initial catalog load incomplete");
    }

    let state = AppState { catalog, upload_token: config.upload_token.clone() };
    let mut app = api::router(state);
    if config.asset_public_url.starts_with('/') {
        app = app.nest_service(&config.asset_public_url, ServeDir::new(&config.asset_root));
    }

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("🌾 Agro Catalog listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
