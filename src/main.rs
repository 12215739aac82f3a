#![allow(clippy::result_large_err)]

use milk_control::{
    config,
    core::{collection::CollectionRepository, producer::ProducerRepository},
    errors::Result,
    store::SqliteStore,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenvy::dotenv().ok();

    // 3. Load the application settings
    let settings = config::settings::load_default_settings()?;
    info!(export_dir = %settings.export_dir.display(), "settings loaded");

    // 4. Initialize the database and the record store
    let db = config::database::create_connection().await?;
    config::database::create_tables(&db).await?;
    info!("database initialized");

    let store = SqliteStore::new(db);
    let producers = ProducerRepository::new(store.clone());
    let collections = CollectionRepository::new(store);

    // 5. Startup summary
    let active = producers.list_active().await?.len();
    let recorded = producers.list().await?.len();
    let collected = collections.list().await?.len();
    info!(
        producers = recorded,
        active, collections = collected, "record store ready"
    );

    Ok(())
}
