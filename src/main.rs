use api_docs_engine::build_app;
use api_docs_engine::config::{AppConfig, StoreBackend};
use api_docs_engine::seed;
use api_docs_engine::store::{MemoryStore, PostgresStore, Store};
use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Info by default, sqlx only at Warn; RUST_LOG overrides both
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .filter_module("sqlx", log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config = AppConfig::load()?;
    info!(
        "Configuration loaded: server={}, backend={:?}, docs base url={}",
        config.server_address(),
        config.database.backend,
        config.docs.base_url
    );

    match config.database.backend {
        StoreBackend::Memory => {
            info!("Using in-memory record store");
            serve(Arc::new(MemoryStore::new()), &config).await
        }
        StoreBackend::Postgres => {
            info!("Connecting to PostgreSQL...");
            let store = PostgresStore::new(&config.database_url(), config.max_connections()).await?;
            info!("Running database migrations...");
            store.migrate().await?;
            serve(Arc::new(store), &config).await
        }
    }
}

async fn serve<S: Store + 'static>(store: Arc<S>, config: &AppConfig) -> anyhow::Result<()> {
    // Load seed data for demonstration (optional)
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        info!("Loading seed data...");
        let project_id = seed::load_seed_data(&*store).await?;
        info!("Seed data loaded: project {}", project_id);
    }

    let app = build_app(store, &config.docs);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    info!("API documentation server running on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
