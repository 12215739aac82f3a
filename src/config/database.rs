//! Database configuration module.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. The
//! schema is generated straight from the entity definitions with
//! `Schema::create_table_from_entity`, so the database always matches the
//! Rust struct definitions without hand-written SQL.

use crate::entities::StoreEntry;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from the environment or returns the default
/// local `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/milk_control.sqlite?mode=rwc".to_string())
}

/// Establishes a connection using `DATABASE_URL`, falling back to a local
/// `SQLite` file when the variable is not set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates the store table from the entity definition. Idempotent, so it
/// runs on every startup.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut store_table = schema.create_table_from_entity(StoreEntry);
    store_table.if_not_exists();
    db.execute(builder.build(&store_table)).await?;

    Ok(())
}
