//! Milk collection repository - CRUD over recorded pickups.
//!
//! Same whole-list read-modify-write shape as the producer repository,
//! with two deliberate differences: collections are hard-deleted (no
//! lifecycle flag), and save/update denormalizes issue ids into full
//! catalog objects and recomputes the stored `total_price`.

use crate::{
    errors::Result,
    ids::{IdGenerator, SystemIdGenerator},
    models::{CollectionFormData, MilkCollection, resolve_issues},
    store::{COLLECTIONS_KEY, RecordStore},
};
use chrono::{DateTime, Utc};
use tracing::warn;

/// Repository for [`MilkCollection`] records.
pub struct CollectionRepository<S, G = SystemIdGenerator> {
    store: S,
    ids: G,
}

impl<S: RecordStore> CollectionRepository<S> {
    /// Creates a repository with the default timestamp+random id generator.
    pub fn new(store: S) -> Self {
        Self {
            store,
            ids: SystemIdGenerator,
        }
    }
}

impl<S: RecordStore, G: IdGenerator> CollectionRepository<S, G> {
    /// Creates a repository with an explicit id generator.
    pub const fn with_id_generator(store: S, ids: G) -> Self {
        Self { store, ids }
    }

    /// Returns every recorded collection.
    ///
    /// Read and parse failures degrade to an empty list, mirroring the
    /// producer repository.
    pub async fn list(&self) -> Result<Vec<MilkCollection>> {
        let raw = match self.store.get(COLLECTIONS_KEY).await {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, "failed to read collections, returning empty list");
                return Ok(Vec::new());
            }
        };
        Ok(raw
            .map(|data| serde_json::from_str(&data).unwrap_or_default())
            .unwrap_or_default())
    }

    /// Finds a collection by id, `None` if absent.
    pub async fn get(&self, id: &str) -> Result<Option<MilkCollection>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|collection| collection.id == id))
    }

    /// All collections recorded against one producer.
    pub async fn list_by_producer(&self, producer_id: &str) -> Result<Vec<MilkCollection>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|collection| collection.producer_id == producer_id)
            .collect())
    }

    /// Collections whose timestamp falls within `[start, end]`.
    ///
    /// Bounds are inclusive and timestamp-precise: a collection stamped
    /// late on the end date is excluded unless `end` itself carries that
    /// time of day.
    pub async fn list_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MilkCollection>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|collection| collection.date >= start && collection.date <= end)
            .collect())
    }

    /// Creates a collection from validated form data: resolves issue ids
    /// against the catalog (unknown ids are dropped), computes
    /// `total_price = quantity * price_per_liter`, stamps timestamps, and
    /// persists the whole list.
    pub async fn create(&self, form: CollectionFormData) -> Result<MilkCollection> {
        let mut collections = self.list().await?;

        let now = chrono::Utc::now();
        let collection = MilkCollection {
            id: self.ids.generate(),
            producer_id: form.producer_id,
            date: form.date,
            quantity: form.quantity,
            price_per_liter: form.price_per_liter,
            total_price: form.quantity * form.price_per_liter,
            issues: resolve_issues(&form.issues),
            notes: form.notes,
            created_at: now,
            updated_at: now,
        };

        collections.push(collection.clone());
        self.persist(&collections).await?;

        Ok(collection)
    }

    /// Merges form fields into an existing collection, re-resolving issues
    /// and recomputing `total_price`. Returns `None` when the id is
    /// unknown.
    pub async fn update(
        &self,
        id: &str,
        form: CollectionFormData,
    ) -> Result<Option<MilkCollection>> {
        let mut collections = self.list().await?;

        let Some(collection) = collections.iter_mut().find(|collection| collection.id == id)
        else {
            return Ok(None);
        };

        collection.producer_id = form.producer_id;
        collection.date = form.date;
        collection.quantity = form.quantity;
        collection.price_per_liter = form.price_per_liter;
        collection.total_price = form.quantity * form.price_per_liter;
        collection.issues = resolve_issues(&form.issues);
        collection.notes = form.notes;
        collection.updated_at = chrono::Utc::now();
        let updated = collection.clone();

        self.persist(&collections).await?;
        Ok(Some(updated))
    }

    /// Physically removes a collection, unlike the producer soft-delete.
    /// Returns `false` when the id is unknown.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let collections = self.list().await?;
        let remaining: Vec<MilkCollection> = collections
            .iter()
            .filter(|collection| collection.id != id)
            .cloned()
            .collect();

        if remaining.len() == collections.len() {
            return Ok(false);
        }

        self.persist(&remaining).await?;
        Ok(true)
    }

    /// Removes the collection key from the store entirely.
    pub async fn clear(&self) -> Result<()> {
        self.store.remove(COLLECTIONS_KEY).await
    }

    async fn persist(&self, collections: &[MilkCollection]) -> Result<()> {
        let payload = serde_json::to_string(collections)?;
        self.store.set(COLLECTIONS_KEY, &payload).await
    }
}
