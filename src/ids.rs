//! Record id generation.
//!
//! Ids are strings of the form `<unix-millis>-<random>`, matching the ids
//! already present in stored data. The generator is a trait so tests can
//! pin ids deterministically.

use rand::Rng;

/// Capability for minting fresh record ids.
pub trait IdGenerator {
    /// Returns a new id. Uniqueness is probabilistic, not guaranteed;
    /// collisions are negligible at this workload.
    fn generate(&self) -> String;
}

/// Default generator: millisecond timestamp plus a random suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdGenerator;

impl IdGenerator for SystemIdGenerator {
    fn generate(&self) -> String {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let random_part = rand::rng().random_range(0..1_000_000);
        format!("{timestamp}-{random_part}")
    }
}
