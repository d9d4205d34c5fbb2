//! Service layer for nfs-web-ui
//!
//! The service layer provides the operations behind the HTTP API and the
//! CLI on top of the storage and backup layers: input validation, the
//! snapshot-before-write cycle, auditing and host status.

pub mod backup;
pub mod export;
pub mod status;

use std::sync::Arc;
use std::time::Duration;

pub use backup::BackupService;
pub use export::{ExportService, MutationOutcome};
pub use status::{HostStatus, StatusProvider, SystemStatusProvider};

use crate::audit::AuditLogger;
use crate::backup::BackupManager;
use crate::config::{ServerPaths, Settings};
use crate::error::ExportsResult;
use crate::storage::ConfigStore;

/// Wait for the external configuration watcher to pick up a write
pub(crate) fn settle(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}

/// All services wired to one configuration directory
pub struct Services {
    pub exports: ExportService,
    pub backups: BackupService,
    pub store: Arc<ConfigStore>,
}

impl Services {
    /// Open the services for the given paths and settings
    ///
    /// Creates the configuration and backup directories when missing.
    pub fn open(paths: &ServerPaths, settings: &Settings) -> ExportsResult<Self> {
        paths.ensure_directories()?;

        let store = Arc::new(ConfigStore::new(paths.exports_file()));
        let manager = Arc::new(BackupManager::new(
            paths.backup_dir().clone(),
            store.clone(),
            settings.max_backups,
        ));
        let audit = Arc::new(AuditLogger::new(paths.audit_log()));

        Ok(Self {
            exports: ExportService::new(store.clone(), manager.clone(), audit.clone(), settings),
            backups: BackupService::new(store.clone(), manager, audit, settings.settle_delay()),
            store,
        })
    }
}
