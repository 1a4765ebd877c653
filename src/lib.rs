pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

pub use api::routes::create_router;
pub use api::AppState;
pub use config::AppConfig;
pub use model::*;
pub use store::{MemoryStore, PostgresStore, Store};

use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::StorageBackend;

/// Open the configured store, seed it when enabled and serve until shutdown
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            log::info!("Connecting to PostgreSQL...");
            let database_url = config.database_url()?;
            let postgres_store = PostgresStore::new(&database_url, config.max_connections()).await?;

            log::info!("Running database migrations...");
            postgres_store.migrate().await?;

            serve_store(Arc::new(postgres_store), &config).await
        }
        StorageBackend::Memory => {
            log::warn!("Using in-memory storage; data is lost on shutdown");
            serve_store(Arc::new(MemoryStore::new()), &config).await
        }
    }
}

async fn serve_store<S: Store + 'static>(store: Arc<S>, config: &AppConfig) -> anyhow::Result<()> {
    if config.seed_enabled() {
        log::info!("Loading seed data...");
        seed::load_seed_data(store.as_ref()).await?;
    }

    let app = create_router::<S>().with_state(AppState::new(store, config.pagination));

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("Catalog API listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
