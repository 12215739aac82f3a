//! Shared test utilities for `MilkControl`.
//!
//! Provides the in-memory store double, a deterministic id generator, and
//! fixture builders with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    config,
    core::{
        collection::CollectionRepository, export::SharePlatform, producer::ProducerRepository,
    },
    errors::{Error, Result},
    ids::IdGenerator,
    models::{CollectionFormData, MilkCollection, Producer, ProducerFormData},
    store::{RecordStore, SqliteStore},
};
use chrono::{DateTime, TimeZone, Utc};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

/// Creates an in-memory `SQLite` database with the store table initialized.
/// This is the standard setup for storage integration tests.
pub async fn setup_test_store() -> Result<SqliteStore> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    config::database::create_tables(&db).await?;
    Ok(SqliteStore::new(db))
}

/// [`RecordStore`] double over a plain `HashMap`, for unit tests that do
/// not need a real database.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl RecordStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.lock().unwrap().keys().cloned().collect())
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>> {
        let entries = self.entries.lock().unwrap();
        Ok(keys
            .iter()
            .map(|key| (key.clone(), entries.get(key).cloned()))
            .collect())
    }

    async fn multi_set(&self, new_entries: &[(String, String)]) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        for (key, value) in new_entries {
            entries.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.lock().unwrap().clear();
        Ok(())
    }
}

/// Id generator producing `test-1`, `test-2`, ... deterministically.
#[derive(Default)]
pub struct FixedIdGenerator {
    counter: AtomicU64,
}

impl IdGenerator for FixedIdGenerator {
    fn generate(&self) -> String {
        let next = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("test-{next}")
    }
}

/// Share double that records what it was asked to share.
#[derive(Default)]
pub struct RecordingShare {
    pub shared: Mutex<Vec<PathBuf>>,
}

impl SharePlatform for RecordingShare {
    fn is_available(&self) -> bool {
        true
    }

    fn share(&self, path: &Path) -> Result<()> {
        self.shared.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// Share double standing in for a user dismissing the share sheet.
pub struct CancellingShare;

impl SharePlatform for CancellingShare {
    fn is_available(&self) -> bool {
        true
    }

    fn share(&self, _path: &Path) -> Result<()> {
        Err(Error::ShareCancelled)
    }
}

/// Producer repository over a fresh in-memory store with deterministic ids.
pub fn memory_repo() -> ProducerRepository<MemoryStore, FixedIdGenerator> {
    ProducerRepository::with_id_generator(MemoryStore::default(), FixedIdGenerator::default())
}

/// Collection repository over a fresh in-memory store with deterministic ids.
pub fn memory_collection_repo() -> CollectionRepository<MemoryStore, FixedIdGenerator> {
    CollectionRepository::with_id_generator(MemoryStore::default(), FixedIdGenerator::default())
}

/// Shorthand UTC timestamp builder.
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .unwrap()
}

/// Producer form with only the required fields set.
pub fn producer_form(name: &str, price_per_liter: f64) -> ProducerFormData {
    ProducerFormData {
        name: name.to_string(),
        address: None,
        phone: None,
        state_registration: None,
        price_per_liter,
        notes: None,
    }
}

/// Collection form with no issues and no notes.
pub fn collection_form(
    producer_id: &str,
    date: DateTime<Utc>,
    quantity: f64,
    price_per_liter: f64,
) -> CollectionFormData {
    CollectionFormData {
        producer_id: producer_id.to_string(),
        date,
        quantity,
        price_per_liter,
        issues: Vec::new(),
        notes: None,
    }
}

/// Fully-built active producer record for pure report tests.
pub fn producer_fixture(id: &str, name: &str, price_per_liter: f64) -> Producer {
    let now = utc(2024, 1, 1, 0, 0, 0);
    Producer {
        id: id.to_string(),
        name: name.to_string(),
        address: None,
        phone: None,
        state_registration: None,
        price_per_liter,
        notes: None,
        active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Fully-built collection record: price 2.5/L, no issues, no notes.
pub fn collection_fixture(
    id: &str,
    producer_id: &str,
    date: DateTime<Utc>,
    quantity: f64,
) -> MilkCollection {
    MilkCollection {
        id: id.to_string(),
        producer_id: producer_id.to_string(),
        date,
        quantity,
        price_per_liter: 2.5,
        total_price: quantity * 2.5,
        issues: Vec::new(),
        notes: None,
        created_at: date,
        updated_at: date,
    }
}
