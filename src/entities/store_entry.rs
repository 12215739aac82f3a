//! Store entry entity - one row per key in the local key-value store.
//!
//! The whole application state lives in this single table: record
//! collections are JSON arrays stored under fixed keys, settings are JSON
//! objects under their own keys. Backup and restore operate on the raw
//! string values without interpreting them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Key-value row backing the record store
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "store_entries")]
pub struct Model {
    /// Storage key, e.g. `@MilkControl:producers`
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Raw string value, usually JSON-encoded
    #[sea_orm(column_type = "Text")]
    pub value: String,
}

/// Store entries have no relations - every value is an opaque string.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
