//! Backup manager for nfs-web-ui
//!
//! Takes byte-for-byte snapshots of the live exports document before every
//! mutation and prunes them down to the retention count.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ExportsError, ExportsResult};
use crate::models::{format_timestamp, ExportsDocument};
use crate::storage::ConfigStore;

/// Snapshot filename prefix
pub const BACKUP_PREFIX: &str = "exports-";

/// Snapshot filename extension
pub const BACKUP_EXTENSION: &str = ".bak";

/// Retention used when none, or zero, is configured
pub const DEFAULT_RETENTION: usize = 10;

/// Metadata about a snapshot
#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    /// Snapshot filename; also its identifier
    pub filename: String,
    /// Full path to the snapshot
    #[serde(skip)]
    pub path: PathBuf,
    /// When the snapshot was taken
    pub created_at: DateTime<Utc>,
    /// Size in bytes
    pub size_bytes: u64,
}

/// Manages snapshot creation, listing and retention
pub struct BackupManager {
    /// Path to backup directory
    backup_dir: PathBuf,
    /// Live document being snapshotted
    store: Arc<ConfigStore>,
    /// Number of snapshots kept
    retention: usize,
}

impl BackupManager {
    /// Create a new BackupManager
    ///
    /// A retention of 0 would prune the snapshot just taken, so it falls
    /// back to `DEFAULT_RETENTION`.
    pub fn new(backup_dir: PathBuf, store: Arc<ConfigStore>, retention: usize) -> Self {
        let retention = if retention == 0 {
            DEFAULT_RETENTION
        } else {
            retention
        };

        Self {
            backup_dir,
            store,
            retention,
        }
    }

    /// Create the backup directory if it is missing
    pub fn ensure_directory(&self) -> ExportsResult<()> {
        fs::create_dir_all(&self.backup_dir).map_err(|e| {
            ExportsError::Backup(format!("Failed to create backup directory: {}", e))
        })
    }

    /// Snapshot the live document, then prune old snapshots
    ///
    /// Returns the new snapshot's filename. Callers mutating the document
    /// must hold the store's write lock and must not proceed if this fails.
    pub fn snapshot(&self) -> ExportsResult<String> {
        let info = self.create_backup()?;

        if let Err(e) = self.enforce_retention() {
            warn!(error = %e, "snapshot pruning failed");
        }

        Ok(info.filename)
    }

    /// Copy the live document's raw bytes into a new snapshot file
    ///
    /// When the document doesn't exist yet the serialized empty document is
    /// stored instead.
    pub fn create_backup(&self) -> ExportsResult<BackupInfo> {
        self.ensure_directory()?;

        let contents = match self.store.read_raw() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => serde_json::to_vec_pretty(&ExportsDocument::new())?,
            Err(e) => {
                return Err(ExportsError::Backup(format!(
                    "Failed to read configuration for backup: {}",
                    e
                )))
            }
        };

        let mut timestamp = Utc::now();
        let (filename, mut file) = loop {
            let filename = backup_filename(timestamp);
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.backup_dir.join(&filename))
            {
                Ok(file) => break (filename, file),
                // Same millisecond as an existing snapshot: move one tick forward
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    timestamp += Duration::milliseconds(1);
                }
                Err(e) => {
                    return Err(ExportsError::Backup(format!(
                        "Failed to create backup file: {}",
                        e
                    )))
                }
            }
        };

        let backup_path = self.backup_dir.join(&filename);
        if let Err(e) = file.write_all(&contents).and_then(|_| file.sync_all()) {
            let _ = fs::remove_file(&backup_path);
            return Err(ExportsError::Backup(format!(
                "Failed to write backup file: {}",
                e
            )));
        }

        info!(backup = %filename, bytes = contents.len(), "snapshot created");

        Ok(BackupInfo {
            filename,
            path: backup_path,
            created_at: timestamp,
            size_bytes: contents.len() as u64,
        })
    }

    /// List all snapshots, newest first
    pub fn list_backups(&self) -> ExportsResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.backup_dir).map_err(|e| {
            ExportsError::Io(format!("Failed to read backup directory: {}", e))
        })? {
            let entry = entry
                .map_err(|e| ExportsError::Io(format!("Failed to read directory entry: {}", e)))?;

            if let Some(info) = parse_backup_info(&entry.path()) {
                backups.push(info);
            }
        }

        // Names embed the timestamp, so name order is chronological order
        backups.sort_by(|a, b| b.filename.cmp(&a.filename));

        Ok(backups)
    }

    /// Delete every snapshot beyond the retention count
    ///
    /// Individual deletion failures are logged and skipped.
    pub fn enforce_retention(&self) -> ExportsResult<Vec<PathBuf>> {
        let backups = self.list_backups()?;
        let mut deleted = Vec::new();

        for backup in backups.into_iter().skip(self.retention) {
            match fs::remove_file(&backup.path) {
                Ok(()) => deleted.push(backup.path),
                Err(e) => warn!(backup = %backup.filename, error = %e, "failed to prune snapshot"),
            }
        }

        if !deleted.is_empty() {
            info!(count = deleted.len(), "pruned old snapshots");
        }

        Ok(deleted)
    }

    /// Get backup directory path
    pub fn backup_dir(&self) -> &PathBuf {
        &self.backup_dir
    }

    /// Retention count
    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Get a specific snapshot by filename
    pub fn get_backup(&self, filename: &str) -> ExportsResult<Option<BackupInfo>> {
        let path = self.resolve(filename)?;
        Ok(parse_backup_info(&path))
    }

    /// Get the most recent snapshot
    pub fn get_latest_backup(&self) -> ExportsResult<Option<BackupInfo>> {
        let backups = self.list_backups()?;
        Ok(backups.into_iter().next())
    }

    /// Read a snapshot's bytes
    pub fn read_backup(&self, filename: &str) -> ExportsResult<Vec<u8>> {
        let path = self.resolve(filename)?;
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ExportsError::backup_not_found(filename),
            _ => ExportsError::Io(format!("Failed to read backup file: {}", e)),
        })
    }

    /// Delete a single snapshot
    pub fn delete_backup(&self, filename: &str) -> ExportsResult<()> {
        let path = self.resolve(filename)?;
        fs::remove_file(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ExportsError::backup_not_found(filename),
            _ => ExportsError::Io(format!("Failed to delete backup file: {}", e)),
        })?;

        info!(backup = %filename, "snapshot deleted");
        Ok(())
    }

    /// Map a snapshot filename to its path inside the backup directory
    fn resolve(&self, filename: &str) -> ExportsResult<PathBuf> {
        if !is_backup_filename(filename) {
            return Err(ExportsError::Validation(format!(
                "Invalid backup filename: {}",
                filename
            )));
        }
        Ok(self.backup_dir.join(filename))
    }
}

/// Check that a name looks like `exports-<timestamp>.bak` and stays inside the backup directory
pub fn is_backup_filename(filename: &str) -> bool {
    filename.len() > BACKUP_PREFIX.len() + BACKUP_EXTENSION.len()
        && filename.starts_with(BACKUP_PREFIX)
        && filename.ends_with(BACKUP_EXTENSION)
        && !filename.contains(['/', '\\'])
        && !filename.contains("..")
}

/// Build a snapshot filename: the ISO-8601 stamp with `:` and `.` replaced by `-`
fn backup_filename(timestamp: DateTime<Utc>) -> String {
    let stamp = format_timestamp(timestamp).replace([':', '.'], "-");
    format!("{}{}{}", BACKUP_PREFIX, stamp, BACKUP_EXTENSION)
}

/// Parse snapshot info from a file in the backup directory
fn parse_backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_string_lossy().to_string();
    if !is_backup_filename(&filename) {
        return None;
    }

    let metadata = fs::metadata(path).ok()?;
    if !metadata.is_file() {
        return None;
    }

    let stamp = filename
        .strip_prefix(BACKUP_PREFIX)?
        .strip_suffix(BACKUP_EXTENSION)?;
    let created_at = parse_backup_timestamp(stamp).or_else(|| {
        metadata
            .created()
            .or_else(|_| metadata.modified())
            .ok()
            .map(DateTime::<Utc>::from)
    })?;

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes: metadata.len(),
    })
}

/// Parse a timestamp of the form `YYYY-MM-DDTHH-MM-SS-mmmZ`
fn parse_backup_timestamp(stamp: &str) -> Option<DateTime<Utc>> {
    let (date_part, time_part) = stamp.split_once('T')?;
    let time_part = time_part.strip_suffix('Z')?;

    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;

    let parts: Vec<&str> = time_part.split('-').collect();
    if parts.len() != 4 {
        return None;
    }
    let hour: u32 = parts[0].parse().ok()?;
    let minute: u32 = parts[1].parse().ok()?;
    let second: u32 = parts[2].parse().ok()?;
    let millis: u32 = parts[3].parse().ok()?;

    let time = NaiveTime::from_hms_milli_opt(hour, minute, second, millis)?;
    Some(DateTime::from_naive_utc_and_offset(date.and_time(time), Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};
    use tempfile::TempDir;

    fn create_test_manager(retention: usize) -> (BackupManager, Arc<ConfigStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(ConfigStore::new(temp_dir.path().join("exports.json")));
        let manager = BackupManager::new(temp_dir.path().join("backups"), store.clone(), retention);
        (manager, store, temp_dir)
    }

    #[test]
    fn test_snapshot_copies_raw_bytes() {
        let (manager, store, _temp) = create_test_manager(10);
        // Imperfect content is preserved as-is
        let raw = b"{\"exports\": [{\"path\": \"/srv/bad\"}],   \"metadata\": {}}";
        fs::write(store.path(), raw).unwrap();

        let id = manager.snapshot().unwrap();
        assert!(id.starts_with(BACKUP_PREFIX));
        assert!(id.ends_with(BACKUP_EXTENSION));

        assert_eq!(manager.read_backup(&id).unwrap(), raw.to_vec());
    }

    #[test]
    fn test_snapshot_without_live_document() {
        let (manager, _store, _temp) = create_test_manager(10);

        let id = manager.snapshot().unwrap();
        let doc: ExportsDocument = serde_json::from_slice(&manager.read_backup(&id).unwrap()).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_snapshot_names_are_unique_and_ordered() {
        let (manager, _store, _temp) = create_test_manager(100);

        let ids: Vec<String> = (0..5).map(|_| manager.snapshot().unwrap()).collect();

        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, ids);
    }

    #[test]
    fn test_list_backups_newest_first() {
        let (manager, _store, _temp) = create_test_manager(10);

        let first = manager.snapshot().unwrap();
        let second = manager.snapshot().unwrap();

        let backups = manager.list_backups().unwrap();
        assert_eq!(backups.len(), 2);
        assert_eq!(backups[0].filename, second);
        assert_eq!(backups[1].filename, first);
        assert!(backups[0].created_at >= backups[1].created_at);
    }

    #[test]
    fn test_list_ignores_foreign_files() {
        let (manager, _store, _temp) = create_test_manager(10);
        manager.ensure_directory().unwrap();
        fs::write(manager.backup_dir().join("notes.txt"), "x").unwrap();
        fs::write(manager.backup_dir().join("exports-.bak"), "x").unwrap();

        assert!(manager.list_backups().unwrap().is_empty());
    }

    #[test]
    fn test_retention_keeps_most_recent() {
        let (manager, _store, _temp) = create_test_manager(3);

        let ids: Vec<String> = (0..5).map(|_| manager.snapshot().unwrap()).collect();

        let remaining: Vec<String> = manager
            .list_backups()
            .unwrap()
            .into_iter()
            .map(|b| b.filename)
            .collect();
        assert_eq!(remaining, vec![ids[4].clone(), ids[3].clone(), ids[2].clone()]);
    }

    #[test]
    fn test_zero_retention_keeps_new_snapshot() {
        let (manager, _store, _temp) = create_test_manager(0);
        assert_eq!(manager.retention(), DEFAULT_RETENTION);

        let id = manager.snapshot().unwrap();
        assert!(manager.read_backup(&id).is_ok());
        assert_eq!(manager.list_backups().unwrap().len(), 1);
    }

    #[test]
    fn test_enforce_retention_reports_deleted() {
        let (manager, _store, _temp) = create_test_manager(2);
        for _ in 0..4 {
            manager.create_backup().unwrap();
        }

        let deleted = manager.enforce_retention().unwrap();
        assert_eq!(deleted.len(), 2);
        assert_eq!(manager.list_backups().unwrap().len(), 2);
    }

    #[test]
    fn test_delete_backup() {
        let (manager, _store, _temp) = create_test_manager(10);
        let id = manager.snapshot().unwrap();

        manager.delete_backup(&id).unwrap();
        assert!(manager.get_backup(&id).unwrap().is_none());
        assert!(manager.delete_backup(&id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_rejects_malformed_filenames() {
        let (manager, _store, _temp) = create_test_manager(10);

        for name in ["../exports.json", "exports-../../x.bak", "backup.json", "exports-x.txt"] {
            assert!(manager.delete_backup(name).unwrap_err().is_validation());
            assert!(manager.read_backup(name).unwrap_err().is_validation());
        }
    }

    #[test]
    fn test_get_latest_backup() {
        let (manager, _store, _temp) = create_test_manager(10);
        assert!(manager.get_latest_backup().unwrap().is_none());

        manager.snapshot().unwrap();
        let id = manager.snapshot().unwrap();

        assert_eq!(manager.get_latest_backup().unwrap().unwrap().filename, id);
    }

    #[test]
    fn test_backup_filename_format() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 17, 9, 5, 3).unwrap() + Duration::milliseconds(42);
        assert_eq!(backup_filename(ts), "exports-2026-10-17T09-05-03-042Z.bak");
    }

    #[test]
    fn test_parse_backup_timestamp() {
        let ts = parse_backup_timestamp("2026-10-17T09-05-03-042Z").unwrap();
        assert_eq!(ts.year(), 2026);
        assert_eq!(ts.month(), 10);
        assert_eq!(ts.hour(), 9);
        assert_eq!(ts.timestamp_subsec_millis(), 42);

        assert!(parse_backup_timestamp("20261017-090503").is_none());
    }
}
