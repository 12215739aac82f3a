//! Core business logic - repositories, backup, aggregation, and export.
//! Everything here is UI-agnostic: operations return data or sentinel
//! values and never present anything to the user themselves.

/// Backup, restore, and import-merge over the whole key space
pub mod backup;
/// Milk collection repository
pub mod collection;
/// Spreadsheet file writing and platform sharing
pub mod export;
/// Producer repository
pub mod producer;
/// User profile persistence
pub mod profile;
/// Pure report aggregation
pub mod report;
