//! Producer repository - CRUD over the producer collection.
//!
//! The whole producer list is stored as one JSON array under a fixed key;
//! every operation deserializes the full list, works on it in memory, and
//! writes the whole list back. Producers are soft-deleted only: `delete`
//! flips the `active` flag and the record stays readable forever.

use crate::{
    errors::Result,
    ids::{IdGenerator, SystemIdGenerator},
    models::{Producer, ProducerFormData},
    store::{PRODUCERS_KEY, RecordStore},
};
use tracing::warn;

/// Repository for [`Producer`] records, generic over the backing store and
/// the id generator so both can be substituted in tests.
pub struct ProducerRepository<S, G = SystemIdGenerator> {
    store: S,
    ids: G,
}

impl<S: RecordStore> ProducerRepository<S> {
    /// Creates a repository with the default timestamp+random id generator.
    pub fn new(store: S) -> Self {
        Self {
            store,
            ids: SystemIdGenerator,
        }
    }
}

impl<S: RecordStore, G: IdGenerator> ProducerRepository<S, G> {
    /// Creates a repository with an explicit id generator.
    pub const fn with_id_generator(store: S, ids: G) -> Self {
        Self { store, ids }
    }

    /// Returns every producer, active or not.
    ///
    /// A read or parse failure degrades to an empty list rather than
    /// propagating - the UI treats "no data" and "unreadable data" the same.
    pub async fn list(&self) -> Result<Vec<Producer>> {
        let raw = match self.store.get(PRODUCERS_KEY).await {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, "failed to read producers, returning empty list");
                return Ok(Vec::new());
            }
        };
        Ok(raw
            .map(|data| serde_json::from_str(&data).unwrap_or_default())
            .unwrap_or_default())
    }

    /// Returns only producers still marked active.
    pub async fn list_active(&self) -> Result<Vec<Producer>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|producer| producer.active)
            .collect())
    }

    /// Finds a producer by id, `None` if absent. Soft-deleted producers
    /// are still found here.
    pub async fn get(&self, id: &str) -> Result<Option<Producer>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|producer| producer.id == id))
    }

    /// Creates a new active producer from validated form data and persists
    /// the whole list. `created_at` and `updated_at` are stamped with the
    /// same instant.
    pub async fn create(&self, form: ProducerFormData) -> Result<Producer> {
        let mut producers = self.list().await?;

        let now = chrono::Utc::now();
        let producer = Producer {
            id: self.ids.generate(),
            name: form.name,
            address: form.address,
            phone: form.phone,
            state_registration: form.state_registration,
            price_per_liter: form.price_per_liter,
            notes: form.notes,
            active: true,
            created_at: now,
            updated_at: now,
        };

        producers.push(producer.clone());
        self.persist(&producers).await?;

        Ok(producer)
    }

    /// Merges form fields into an existing producer and refreshes
    /// `updated_at`. Returns `None` when the id is unknown.
    pub async fn update(&self, id: &str, form: ProducerFormData) -> Result<Option<Producer>> {
        let mut producers = self.list().await?;

        let Some(producer) = producers.iter_mut().find(|producer| producer.id == id) else {
            return Ok(None);
        };

        producer.name = form.name;
        producer.address = form.address;
        producer.phone = form.phone;
        producer.state_registration = form.state_registration;
        producer.price_per_liter = form.price_per_liter;
        producer.notes = form.notes;
        producer.updated_at = chrono::Utc::now();
        let updated = producer.clone();

        self.persist(&producers).await?;
        Ok(Some(updated))
    }

    /// Soft-deletes a producer: sets `active = false` and refreshes
    /// `updated_at`. Returns `false` when the id is unknown.
    pub async fn soft_delete(&self, id: &str) -> Result<bool> {
        let mut producers = self.list().await?;

        let Some(producer) = producers.iter_mut().find(|producer| producer.id == id) else {
            return Ok(false);
        };

        producer.active = false;
        producer.updated_at = chrono::Utc::now();

        self.persist(&producers).await?;
        Ok(true)
    }

    /// Removes the producer key from the store entirely.
    pub async fn clear(&self) -> Result<()> {
        self.store.remove(PRODUCERS_KEY).await
    }

    async fn persist(&self, producers: &[Producer]) -> Result<()> {
        let payload = serde_json::to_string(producers)?;
        self.store.set(PRODUCERS_KEY, &payload).await
    }
}
