//! Backup, restore, and import-merge over the whole key space.
//!
//! A backup is a JSON object mapping every storage key to its raw string
//! value. Restore is a destructive full replace; import is a per-key
//! merge that unions the two record-collection arrays by record id and
//! applies first-write-wins to everything else. "Nothing new to import"
//! is an `Ok(false)`, distinct from the hard failures in the error enum.

use crate::{
    core::export::{SharePlatform, ShareStatus},
    errors::{Error, Result},
    store::{COLLECTIONS_KEY, PRODUCERS_KEY, RecordStore},
};
use serde_json::Value;
use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Coordinates snapshot files against a [`RecordStore`].
pub struct BackupEngine<S> {
    store: S,
    backup_dir: PathBuf,
}

impl<S: RecordStore> BackupEngine<S> {
    /// Creates an engine writing backup files into `backup_dir`.
    pub fn new(store: S, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            backup_dir: backup_dir.into(),
        }
    }

    /// Snapshots every key in the store to
    /// `controle_produtor_backup_<YYYYMMDD>.json` in the backup directory
    /// and returns the file path.
    ///
    /// # Errors
    /// [`Error::NoBackupData`] when the key space is empty; I/O errors
    /// propagate.
    pub async fn create_backup(&self) -> Result<PathBuf> {
        let keys = self.store.keys().await?;
        if keys.is_empty() {
            return Err(Error::NoBackupData);
        }

        let pairs = self.store.multi_get(&keys).await?;
        let mut data = serde_json::Map::new();
        for (key, value) in pairs {
            data.insert(key, value.map_or(Value::Null, Value::String));
        }

        let stamp = chrono::Utc::now().format("%Y%m%d");
        let file_name = format!("controle_produtor_backup_{stamp}.json");
        let path = self.backup_dir.join(file_name);

        tokio::fs::create_dir_all(&self.backup_dir).await?;
        tokio::fs::write(&path, serde_json::to_string(&Value::Object(data))?).await?;

        info!(path = %path.display(), "backup written");
        Ok(path)
    }

    /// Snapshots the store, then offers the resulting file to the
    /// platform share sheet. The file stays on disk either way.
    ///
    /// # Errors
    /// Backup failures propagate; [`Error::ShareCancelled`] when the
    /// user dismisses the sheet. An absent share mechanism is reported
    /// as [`ShareStatus::Unavailable`], not an error.
    pub async fn create_and_share_backup(
        &self,
        platform: &dyn SharePlatform,
    ) -> Result<(PathBuf, ShareStatus)> {
        let path = self.create_backup().await?;

        if !platform.is_available() {
            return Ok((path, ShareStatus::Unavailable));
        }
        platform.share(&path)?;
        Ok((path, ShareStatus::Shared))
    }

    /// Restores the store from a backup file: full, destructive replace.
    ///
    /// The store is cleared and every non-null entry of the backup is
    /// written back. Returns only after all writes complete, so callers
    /// can reload immediately.
    ///
    /// # Errors
    /// [`Error::InvalidBackupFormat`] when the file is not a JSON object;
    /// I/O errors propagate.
    pub async fn restore_from_file(&self, path: &Path) -> Result<()> {
        let data = read_backup_mapping(path).await?;

        self.store.clear().await?;

        let entries: Vec<(String, String)> = data
            .into_iter()
            .filter_map(|(key, value)| raw_string(value).map(|v| (key, v)))
            .collect();
        if !entries.is_empty() {
            self.store.multi_set(&entries).await?;
        }

        info!(entries = entries.len(), "store restored from backup");
        Ok(())
    }

    /// Merges an external backup into the store without replacing local
    /// data.
    ///
    /// For the producer and collection keys, incoming records whose id is
    /// not present locally are appended; every other key is imported only
    /// when absent. Returns `Ok(false)` when the file held nothing new.
    ///
    /// # Errors
    /// [`Error::InvalidBackupFormat`] when the file is not a JSON object;
    /// I/O errors propagate.
    pub async fn import_from_file(&self, path: &Path) -> Result<bool> {
        let imported = read_backup_mapping(path).await?;

        let current_keys = self.store.keys().await?;
        let current: HashMap<String, String> = self
            .store
            .multi_get(&current_keys)
            .await?
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect();

        let mut staged: Vec<(String, String)> = Vec::new();

        for (key, value) in imported {
            let Some(incoming) = raw_string(value) else {
                continue;
            };

            if key == PRODUCERS_KEY || key == COLLECTIONS_KEY {
                match current.get(&key) {
                    Some(existing) => {
                        if let Some(merged) = merge_record_arrays(existing, &incoming) {
                            staged.push((key, merged));
                        }
                    }
                    None => staged.push((key, incoming)),
                }
            } else if !current.contains_key(&key) {
                // Non-list keys are first-write-wins: local data stays.
                staged.push((key, incoming));
            }
        }

        if staged.is_empty() {
            debug!("import found nothing new");
            return Ok(false);
        }

        self.store.multi_set(&staged).await?;
        info!(keys = staged.len(), "import merged new data");
        Ok(true)
    }

    /// Erases every key in the store. Returns `false` when there was
    /// nothing to erase.
    pub async fn clear_all(&self) -> Result<bool> {
        if self.store.keys().await?.is_empty() {
            return Ok(false);
        }
        self.store.clear().await?;
        Ok(true)
    }
}

/// Checks that a file holds a non-empty JSON object. Any read or parse
/// failure reads as "not valid" rather than an error.
pub async fn validate_backup_file(path: &Path) -> bool {
    match read_backup_mapping(path).await {
        Ok(data) => !data.is_empty(),
        Err(_) => false,
    }
}

/// Reads and parses a backup file into its key-to-value mapping.
async fn read_backup_mapping(path: &Path) -> Result<serde_json::Map<String, Value>> {
    let contents = tokio::fs::read_to_string(path).await?;
    let parsed: Value =
        serde_json::from_str(&contents).map_err(|_| Error::InvalidBackupFormat)?;
    match parsed {
        Value::Object(map) => Ok(map),
        _ => Err(Error::InvalidBackupFormat),
    }
}

/// The raw string form of a backup value. Nulls are dropped; non-string
/// scalars are coerced, matching what older exports may contain.
fn raw_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Unions two JSON record arrays by record id.
///
/// Keeps every existing record and appends only incoming records whose id
/// is not already present. Returns `None` when no new record was found
/// (so the key is not staged at all). If either side fails to parse as an
/// array, the incoming value is taken verbatim.
fn merge_record_arrays(existing: &str, incoming: &str) -> Option<String> {
    let (Ok(Value::Array(existing_items)), Ok(Value::Array(incoming_items))) = (
        serde_json::from_str::<Value>(existing),
        serde_json::from_str::<Value>(incoming),
    ) else {
        return Some(incoming.to_string());
    };

    let existing_ids: HashSet<String> = existing_items
        .iter()
        .filter_map(record_id)
        .collect();

    let new_items: Vec<Value> = incoming_items
        .into_iter()
        .filter(|item| record_id(item).is_some_and(|id| !existing_ids.contains(&id)))
        .collect();

    if new_items.is_empty() {
        return None;
    }

    let mut merged = existing_items;
    merged.extend(new_items);
    // Serializing a Value::Array cannot fail
    serde_json::to_string(&Value::Array(merged)).ok()
}

fn record_id(item: &Value) -> Option<String> {
    item.get("id").and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::export::NoSharing;
    use crate::test_utils::{CancellingShare, MemoryStore, RecordingShare};
    use tempfile::TempDir;

    fn engine_with_dir() -> (BackupEngine<MemoryStore>, MemoryStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::default();
        let engine = BackupEngine::new(store.clone(), dir.path());
        (engine, store, dir)
    }

    async fn write_backup(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        tokio::fs::write(&path, contents).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_backup_empty_store_reports_no_data() {
        let (engine, _store, _dir) = engine_with_dir();
        let result = engine.create_backup().await;
        assert!(matches!(result, Err(Error::NoBackupData)));
    }

    #[tokio::test]
    async fn test_backup_then_restore_roundtrip() -> Result<()> {
        let (engine, store, dir) = engine_with_dir();
        store.set(PRODUCERS_KEY, r#"[{"id":"1"}]"#).await?;
        store.set("user_data", r#"{"name":"Ana"}"#).await?;

        let path = engine.create_backup().await?;
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("controle_produtor_backup_")
        );

        // Restore into a fresh store
        let target = MemoryStore::default();
        let target_engine = BackupEngine::new(target.clone(), dir.path());
        target_engine.restore_from_file(&path).await?;

        let mut keys = target.keys().await?;
        keys.sort();
        assert_eq!(keys, vec![PRODUCERS_KEY.to_string(), "user_data".to_string()]);
        assert_eq!(
            target.get(PRODUCERS_KEY).await?.as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_backup_file_imports_into_another_store() -> Result<()> {
        let (engine, store, dir) = engine_with_dir();
        store
            .set(PRODUCERS_KEY, r#"[{"id":"1","name":"Ana"}]"#)
            .await?;
        store.set(COLLECTIONS_KEY, r#"[{"id":"c1"}]"#).await?;

        let path = engine.create_backup().await?;

        let target = MemoryStore::default();
        let target_engine = BackupEngine::new(target.clone(), dir.path());
        assert!(target_engine.import_from_file(&path).await?);

        assert_eq!(
            target.get(PRODUCERS_KEY).await?.as_deref(),
            Some(r#"[{"id":"1","name":"Ana"}]"#)
        );
        assert_eq!(
            target.get(COLLECTIONS_KEY).await?.as_deref(),
            Some(r#"[{"id":"c1"}]"#)
        );

        // Every id is now present locally, so a second import finds
        // nothing new.
        assert!(!target_engine.import_from_file(&path).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_backup_is_offered_to_the_share_sheet() -> Result<()> {
        let (engine, store, _dir) = engine_with_dir();
        store.set(PRODUCERS_KEY, r#"[{"id":"1"}]"#).await?;

        let platform = RecordingShare::default();
        let (path, status) = engine.create_and_share_backup(&platform).await?;

        assert_eq!(status, ShareStatus::Shared);
        assert_eq!(*platform.shared.lock().unwrap(), vec![path]);

        Ok(())
    }

    #[tokio::test]
    async fn test_backup_share_unavailable_still_writes_the_file() -> Result<()> {
        let (engine, store, _dir) = engine_with_dir();
        store.set(PRODUCERS_KEY, r#"[{"id":"1"}]"#).await?;

        let (path, status) = engine.create_and_share_backup(&NoSharing).await?;

        assert_eq!(status, ShareStatus::Unavailable);
        assert!(path.exists());

        Ok(())
    }

    #[tokio::test]
    async fn test_backup_share_cancellation_propagates() -> Result<()> {
        let (engine, store, _dir) = engine_with_dir();
        store.set(PRODUCERS_KEY, r#"[{"id":"1"}]"#).await?;

        let result = engine.create_and_share_backup(&CancellingShare).await;
        assert!(matches!(result, Err(Error::ShareCancelled)));

        Ok(())
    }

    #[tokio::test]
    async fn test_restore_is_destructive() -> Result<()> {
        let (engine, store, dir) = engine_with_dir();
        store.set("stale_key", "stale").await?;
        store.set(PRODUCERS_KEY, r#"[{"id":"old"}]"#).await?;

        let path = write_backup(&dir, "b.json", r#"{"only_key":"v"}"#).await;
        engine.restore_from_file(&path).await?;

        // Key set now equals exactly the backup's non-null keys
        assert_eq!(store.keys().await?, vec!["only_key".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn test_restore_skips_null_values() -> Result<()> {
        let (engine, store, dir) = engine_with_dir();

        let path = write_backup(&dir, "b.json", r#"{"a":"1","b":null}"#).await;
        engine.restore_from_file(&path).await?;

        assert_eq!(store.keys().await?, vec!["a".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn test_restore_rejects_malformed_and_non_object_files() {
        let (engine, _store, dir) = engine_with_dir();

        let garbage = write_backup(&dir, "garbage.json", "{not json").await;
        assert!(matches!(
            engine.restore_from_file(&garbage).await,
            Err(Error::InvalidBackupFormat)
        ));

        let array = write_backup(&dir, "array.json", "[1,2,3]").await;
        assert!(matches!(
            engine.restore_from_file(&array).await,
            Err(Error::InvalidBackupFormat)
        ));
    }

    #[tokio::test]
    async fn test_import_unions_record_arrays_by_id() -> Result<()> {
        let (engine, store, dir) = engine_with_dir();
        store
            .set(PRODUCERS_KEY, r#"[{"id":"1","name":"Local"}]"#)
            .await?;

        let path = write_backup(
            &dir,
            "import.json",
            r#"{"@MilkControl:producers":"[{\"id\":\"1\",\"name\":\"Remote\"},{\"id\":\"2\",\"name\":\"Nova\"}]"}"#,
        )
        .await;

        assert!(engine.import_from_file(&path).await?);

        let merged: Vec<Value> =
            serde_json::from_str(&store.get(PRODUCERS_KEY).await?.unwrap())?;
        let ids: Vec<&str> = merged.iter().filter_map(|v| v["id"].as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        // The local record wins over the incoming duplicate
        assert_eq!(merged[0]["name"], "Local");

        Ok(())
    }

    #[tokio::test]
    async fn test_import_is_idempotent() -> Result<()> {
        let (engine, store, dir) = engine_with_dir();

        let path = write_backup(
            &dir,
            "import.json",
            r#"{"@MilkControl:collections":"[{\"id\":\"c1\"},{\"id\":\"c2\"}]"}"#,
        )
        .await;

        assert!(engine.import_from_file(&path).await?);
        // Second pass: every id already present, nothing staged
        assert!(!engine.import_from_file(&path).await?);

        let items: Vec<Value> =
            serde_json::from_str(&store.get(COLLECTIONS_KEY).await?.unwrap())?;
        assert_eq!(items.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_import_preserves_all_existing_records() -> Result<()> {
        let (engine, store, dir) = engine_with_dir();
        store
            .set(COLLECTIONS_KEY, r#"[{"id":"a"},{"id":"b"}]"#)
            .await?;

        let path = write_backup(
            &dir,
            "import.json",
            r#"{"@MilkControl:collections":"[{\"id\":\"c\"}]"}"#,
        )
        .await;
        engine.import_from_file(&path).await?;

        let items: Vec<Value> =
            serde_json::from_str(&store.get(COLLECTIONS_KEY).await?.unwrap())?;
        let ids: HashSet<&str> = items.iter().filter_map(|v| v["id"].as_str()).collect();
        assert!(items.len() >= 2);
        assert!(ids.contains("a") && ids.contains("b") && ids.contains("c"));

        Ok(())
    }

    #[tokio::test]
    async fn test_import_other_keys_are_first_write_wins() -> Result<()> {
        let (engine, store, dir) = engine_with_dir();
        store.set("user_data", r#"{"name":"Local"}"#).await?;

        let path = write_backup(
            &dir,
            "import.json",
            r#"{"user_data":"{\"name\":\"Remote\"}","fresh_key":"imported"}"#,
        )
        .await;

        assert!(engine.import_from_file(&path).await?);
        assert_eq!(
            store.get("user_data").await?.as_deref(),
            Some(r#"{"name":"Local"}"#)
        );
        assert_eq!(store.get("fresh_key").await?.as_deref(), Some("imported"));

        Ok(())
    }

    #[tokio::test]
    async fn test_import_record_key_absent_locally_copies_verbatim() -> Result<()> {
        let (engine, store, dir) = engine_with_dir();

        let path = write_backup(
            &dir,
            "import.json",
            r#"{"@MilkControl:producers":"[{\"id\":\"1\"}]"}"#,
        )
        .await;
        assert!(engine.import_from_file(&path).await?);
        assert_eq!(
            store.get(PRODUCERS_KEY).await?.as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_import_nothing_new_returns_false() -> Result<()> {
        let (engine, store, dir) = engine_with_dir();
        store.set("user_data", "{}").await?;

        let path = write_backup(&dir, "import.json", r#"{"user_data":"{}"}"#).await;
        assert!(!engine.import_from_file(&path).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_validate_backup_file() {
        let dir = TempDir::new().unwrap();

        let valid = write_backup(&dir, "ok.json", r#"{"a":"1"}"#).await;
        assert!(validate_backup_file(&valid).await);

        let empty = write_backup(&dir, "empty.json", "{}").await;
        assert!(!validate_backup_file(&empty).await);

        let broken = write_backup(&dir, "broken.json", "nope").await;
        assert!(!validate_backup_file(&broken).await);

        assert!(!validate_backup_file(dir.path().join("missing.json").as_path()).await);
    }

    #[tokio::test]
    async fn test_clear_all() -> Result<()> {
        let (engine, store, _dir) = engine_with_dir();

        assert!(!engine.clear_all().await?);

        store.set("a", "1").await?;
        assert!(engine.clear_all().await?);
        assert!(store.keys().await?.is_empty());

        Ok(())
    }
}
