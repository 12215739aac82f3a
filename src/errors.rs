//! Unified error types and result handling.

use thiserror::Error;

/// All failure conditions surfaced by the storage, backup, and export layers.
///
/// Repository lookups on a missing id do not use this enum - they return
/// `Option`/`bool` sentinels the caller must check.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong while loading configuration
        message: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The key space is empty, so there is nothing to snapshot.
    #[error("No data available to back up")]
    NoBackupData,

    /// The selected file is not a JSON mapping of storage keys to values.
    #[error("Invalid backup file format")]
    InvalidBackupFormat,

    /// A report was requested over an empty data set.
    #[error("Nothing to export: {context}")]
    NothingToExport {
        /// Which report and why it came up empty
        context: String,
    },

    /// The user dismissed the platform share sheet. Callers should stay
    /// silent rather than alerting on this.
    #[error("Sharing cancelled by the user")]
    ShareCancelled,
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
