//! Entity module - Contains the SeaORM entity definitions for the database.
//! The store is a single key-value table; everything else is JSON inside it.

pub mod store_entry;

pub use store_entry::{Column as StoreEntryColumn, Entity as StoreEntry, Model as StoreEntryModel};
