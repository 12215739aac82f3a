//! Persistent record store - a string key-value map backed by SQLite.
//!
//! Repositories and the backup engine talk to storage exclusively through
//! the [`RecordStore`] trait, so tests can swap the SQLite-backed
//! implementation for an in-memory double. The surface intentionally stays
//! small: get/set/remove single keys, enumerate the key space, and batch
//! variants used by backup and import.

use crate::{
    entities::{StoreEntry, store_entry},
    errors::Result,
};
use sea_orm::{DatabaseConnection, Set, prelude::*, sea_query::OnConflict};

/// Storage key holding the JSON array of producers.
pub const PRODUCERS_KEY: &str = "@MilkControl:producers";
/// Storage key holding the JSON array of milk collections.
pub const COLLECTIONS_KEY: &str = "@MilkControl:collections";
/// Storage key holding the JSON object with the user's own identity data.
pub const USER_DATA_KEY: &str = "user_data";

/// Abstract key-value store the repositories and backup engine run against.
#[allow(async_fn_in_trait)]
pub trait RecordStore: Clone {
    /// Returns the raw string value under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key` entirely. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Every key currently present in the store.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Fetches several keys at once, pairing each with its value (or `None`).
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>>;

    /// Writes several entries in one batch.
    async fn multi_set(&self, entries: &[(String, String)]) -> Result<()>;

    /// Drops every key in the store.
    async fn clear(&self) -> Result<()>;
}

/// [`RecordStore`] implementation over the `store_entries` SQLite table.
#[derive(Clone)]
pub struct SqliteStore {
    db: DatabaseConnection,
}

impl SqliteStore {
    /// Wraps an already-connected database. Tables must exist; see
    /// [`crate::config::database::create_tables`].
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl RecordStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = StoreEntry::find_by_id(key).one(&self.db).await?;
        Ok(entry.map(|e| e.value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let entry = store_entry::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
        };
        StoreEntry::insert(entry)
            .on_conflict(
                OnConflict::column(store_entry::Column::Key)
                    .update_column(store_entry::Column::Value)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        StoreEntry::delete_by_id(key).exec(&self.db).await?;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let entries = StoreEntry::find().all(&self.db).await?;
        Ok(entries.into_iter().map(|e| e.key).collect())
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>> {
        let mut pairs = Vec::with_capacity(keys.len());
        for key in keys {
            pairs.push((key.clone(), self.get(key).await?));
        }
        Ok(pairs)
    }

    async fn multi_set(&self, entries: &[(String, String)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        StoreEntry::delete_many().exec(&self.db).await?;
        Ok(())
    }
}
