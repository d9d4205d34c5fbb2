//! Backup service
//!
//! Snapshot administration shared by the HTTP API and the CLI: listing,
//! on-demand snapshots, restore and deletion, with auditing.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::backup::{BackupInfo, BackupManager, RestoreManager, RestoreResult, ValidationResult};
use crate::error::{ExportsError, ExportsResult};
use crate::storage::ConfigStore;

use super::settle;

/// Service for snapshot management
pub struct BackupService {
    store: Arc<ConfigStore>,
    manager: Arc<BackupManager>,
    restorer: RestoreManager,
    audit: Arc<AuditLogger>,
    settle_delay: Duration,
}

impl BackupService {
    /// Create a new backup service
    pub fn new(
        store: Arc<ConfigStore>,
        manager: Arc<BackupManager>,
        audit: Arc<AuditLogger>,
        settle_delay: Duration,
    ) -> Self {
        let restorer = RestoreManager::new(store.clone(), manager.clone());
        Self {
            store,
            manager,
            restorer,
            audit,
            settle_delay,
        }
    }

    /// List all snapshots, newest first
    pub fn list(&self) -> ExportsResult<Vec<BackupInfo>> {
        self.manager.list_backups()
    }

    /// Get a snapshot by filename
    pub fn get(&self, filename: &str) -> ExportsResult<Option<BackupInfo>> {
        self.manager.get_backup(filename)
    }

    /// Get the most recent snapshot
    pub fn latest(&self) -> ExportsResult<Option<BackupInfo>> {
        self.manager.get_latest_backup()
    }

    /// Take an on-demand snapshot of the live document
    pub fn create(&self) -> ExportsResult<BackupInfo> {
        let info = {
            let _guard = self.store.lock()?;
            self.manager.create_backup()?
        };
        if let Err(e) = self.manager.enforce_retention() {
            warn!(error = %e, "snapshot pruning failed");
        }
        Ok(info)
    }

    /// Restore the live document from a snapshot
    pub fn restore(&self, filename: &str, actor: &str) -> ExportsResult<RestoreResult> {
        let result = self.restorer.restore(filename)?;

        self.audit.record(
            &AuditEntry::restore(filename)
                .with_actor(actor)
                .with_backup(&result.pre_restore_backup),
        );

        settle(self.settle_delay);
        Ok(result)
    }

    /// Describe a snapshot without restoring it
    pub fn inspect(&self, filename: &str) -> ExportsResult<ValidationResult> {
        self.restorer.validate_backup(filename)
    }

    /// Delete a single snapshot
    pub fn delete(&self, filename: &str, actor: &str) -> ExportsResult<()> {
        let info = self
            .manager
            .get_backup(filename)?
            .ok_or_else(|| ExportsError::backup_not_found(filename))?;
        self.manager.delete_backup(filename)?;

        self.audit
            .record(&AuditEntry::delete(EntityType::Backup, filename, &info).with_actor(actor));

        Ok(())
    }

    /// Delete snapshots beyond the retention count
    pub fn prune(&self) -> ExportsResult<Vec<PathBuf>> {
        let deleted = self.manager.enforce_retention()?;
        info!(count = deleted.len(), retention = self.manager.retention(), "prune finished");
        Ok(deleted)
    }

    /// Directory holding the snapshots
    pub fn backup_dir(&self) -> &PathBuf {
        self.manager.backup_dir()
    }
}
