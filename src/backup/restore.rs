//! Snapshot restoration for nfs-web-ui
//!
//! Restores overwrite the live document with a snapshot's content, after
//! snapshotting the current state so the restore itself can be undone.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::ExportsResult;
use crate::models::ExportsDocument;
use crate::storage::{parse_document, ConfigStore};

use super::manager::BackupManager;

/// Handles restoring from snapshots
pub struct RestoreManager {
    store: Arc<ConfigStore>,
    backups: Arc<BackupManager>,
}

impl RestoreManager {
    /// Create a new RestoreManager
    pub fn new(store: Arc<ConfigStore>, backups: Arc<BackupManager>) -> Self {
        Self { store, backups }
    }

    /// Restore the live document from the named snapshot
    ///
    /// The snapshot content is written verbatim without export validation.
    /// A snapshot that isn't a JSON object is replaced by an empty
    /// placeholder document rather than failing the restore.
    pub fn restore(&self, filename: &str) -> ExportsResult<RestoreResult> {
        let _guard = self.store.lock()?;

        // Fails with NotFound / Validation before anything is written
        let contents = self.backups.read_backup(filename)?;

        let pre_restore_backup = self.backups.snapshot()?;

        let used_placeholder = match serde_json::from_slice::<Value>(&contents) {
            Ok(Value::Object(root)) => {
                self.store.save_raw(root)?;
                false
            }
            _ => {
                warn!(backup = %filename, "snapshot is not a valid document, writing empty placeholder");
                let mut placeholder = ExportsDocument::restored_placeholder(Utc::now());
                self.store.save(&mut placeholder)?;
                true
            }
        };

        info!(
            backup = %filename,
            pre_restore_backup = %pre_restore_backup,
            "configuration restored"
        );

        Ok(RestoreResult {
            restored: filename.to_string(),
            pre_restore_backup,
            used_placeholder,
        })
    }

    /// Inspect a snapshot without restoring it
    pub fn validate_backup(&self, filename: &str) -> ExportsResult<ValidationResult> {
        let contents = self.backups.read_backup(filename)?;

        let is_document = matches!(
            serde_json::from_slice::<Value>(&contents),
            Ok(Value::Object(_))
        );
        let loaded = parse_document(&contents);

        Ok(ValidationResult {
            is_document,
            export_count: loaded.document.len(),
            warnings: loaded.warnings,
        })
    }
}

/// Result of a restore operation
#[derive(Debug, Clone)]
pub struct RestoreResult {
    /// Snapshot that was restored
    pub restored: String,
    /// Snapshot of the state that was overwritten
    pub pre_restore_backup: String,
    /// Whether the snapshot was unreadable and an empty document was written
    pub used_placeholder: bool,
}

impl RestoreResult {
    /// Get a summary of what was restored
    pub fn summary(&self) -> String {
        if self.used_placeholder {
            format!(
                "Restored empty configuration ({} was unreadable); previous state saved as {}",
                self.restored, self.pre_restore_backup
            )
        } else {
            format!(
                "Restored {}; previous state saved as {}",
                self.restored, self.pre_restore_backup
            )
        }
    }
}

/// Result of inspecting a snapshot
#[derive(Debug)]
pub struct ValidationResult {
    /// Whether the snapshot parses as a document
    pub is_document: bool,
    /// Number of valid exports it contains
    pub export_count: usize,
    /// Records that would be dropped on load
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Get a summary of the snapshot content
    pub fn summary(&self) -> String {
        if !self.is_document {
            return "Unreadable snapshot (an empty configuration would be restored)".to_string();
        }
        if self.warnings.is_empty() {
            format!("{} export(s)", self.export_count)
        } else {
            format!(
                "{} export(s), {} warning(s)",
                self.export_count,
                self.warnings.len()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, Export, Permission};
    use std::fs;
    use tempfile::TempDir;

    fn create_test_env() -> (RestoreManager, Arc<BackupManager>, Arc<ConfigStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(ConfigStore::new(temp_dir.path().join("exports.json")));
        let backups = Arc::new(BackupManager::new(
            temp_dir.path().join("backups"),
            store.clone(),
            10,
        ));
        let restore_manager = RestoreManager::new(store.clone(), backups.clone());

        (restore_manager, backups, store, temp_dir)
    }

    fn save_single_export(store: &ConfigStore, path: &str) {
        let mut doc = ExportsDocument::new();
        doc.exports.push(Export::new(
            path,
            vec![Client::new("10.0.0.1", Permission::Rw)],
        ));
        store.save(&mut doc).unwrap();
    }

    #[test]
    fn test_restore_round_trip() {
        let (restore_manager, backups, store, _temp) = create_test_env();

        save_single_export(&store, "/srv/original");
        let snapshot = backups.snapshot().unwrap();
        save_single_export(&store, "/srv/changed");

        let result = restore_manager.restore(&snapshot).unwrap();
        assert_eq!(result.restored, snapshot);
        assert!(!result.used_placeholder);

        let loaded = store.load().unwrap();
        assert_eq!(loaded.document.len(), 1);
        assert_eq!(loaded.document.exports[0].path, "/srv/original");

        // The overwritten state is recoverable
        let undo = backups.read_backup(&result.pre_restore_backup).unwrap();
        let previous = parse_document(&undo);
        assert_eq!(previous.document.exports[0].path, "/srv/changed");
    }

    #[test]
    fn test_restore_keeps_invalid_records() {
        let (restore_manager, backups, store, _temp) = create_test_env();
        fs::write(
            store.path(),
            r#"{"exports": [{"path": "/srv/legacy"}], "metadata": {}}"#,
        )
        .unwrap();
        let snapshot = backups.snapshot().unwrap();

        restore_manager.restore(&snapshot).unwrap();

        let written: Value = serde_json::from_slice(&fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(written["exports"][0]["path"], "/srv/legacy");
        assert!(written["metadata"]["lastModified"].is_string());
    }

    #[test]
    fn test_restore_unparsable_snapshot_writes_placeholder() {
        let (restore_manager, backups, store, _temp) = create_test_env();
        backups.ensure_directory().unwrap();
        let legacy = "exports-2020-01-01T00-00-00-000Z.bak";
        fs::write(backups.backup_dir().join(legacy), "/srv/nfs 10.0.0.1(rw)\n").unwrap();

        let result = restore_manager.restore(legacy).unwrap();
        assert!(result.used_placeholder);

        let loaded = store.load().unwrap();
        assert!(loaded.document.is_empty());
        assert_eq!(
            loaded.document.metadata["description"],
            "NFS Exports restored from backup"
        );
        assert_eq!(loaded.document.metadata["version"], "1.0");
    }

    #[test]
    fn test_restore_missing_snapshot_writes_nothing() {
        let (restore_manager, backups, store, _temp) = create_test_env();
        save_single_export(&store, "/srv/keep");
        let before = fs::read(store.path()).unwrap();

        let err = restore_manager
            .restore("exports-2020-01-01T00-00-00-000Z.bak")
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(backups.list_backups().unwrap().is_empty());
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn test_restore_rejects_bad_filename() {
        let (restore_manager, _backups, _store, _temp) = create_test_env();
        assert!(restore_manager
            .restore("../exports.json")
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_validate_backup() {
        let (restore_manager, backups, store, _temp) = create_test_env();
        save_single_export(&store, "/srv/a");
        let snapshot = backups.snapshot().unwrap();

        let result = restore_manager.validate_backup(&snapshot).unwrap();
        assert!(result.is_document);
        assert_eq!(result.export_count, 1);
        assert_eq!(result.summary(), "1 export(s)");
    }

    #[test]
    fn test_restore_result_summary() {
        let result = RestoreResult {
            restored: "exports-a.bak".into(),
            pre_restore_backup: "exports-b.bak".into(),
            used_placeholder: false,
        };
        assert!(result.summary().contains("exports-b.bak"));
    }
}
