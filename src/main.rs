use catalog_api::config::AppConfig;
use env_logger::{Builder, Env};
use log::LevelFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Info by default, sqlx debug logs suppressed; RUST_LOG still applies on top
    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("sqlx", LevelFilter::Warn)
        .init();

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={} storage={:?}",
        config.server_address(),
        config.storage.backend
    );

    catalog_api::run_server(config).await
}
