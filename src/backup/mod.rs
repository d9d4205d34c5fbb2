//! Backup system for nfs-web-ui
//!
//! Every mutation of the exports document is preceded by a snapshot: a
//! byte-for-byte copy of the live file in the backup directory.
//!
//! # Architecture
//!
//! - `BackupManager`: takes, lists, deletes and prunes snapshots
//! - `RestoreManager`: overwrites the live document from a snapshot
//!
//! # Snapshot naming
//!
//! Snapshots are named `exports-<timestamp>.bak`, where the timestamp is
//! ISO-8601 UTC with `:` and `.` replaced by `-`
//! (`exports-2026-10-17T09-05-03-042Z.bak`). Lexicographic order equals
//! chronological order, which is what retention relies on.
//!
//! # Retention
//!
//! After each snapshot only the newest `max_backups` (default 10) are kept.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use nfs_web_ui::backup::{BackupManager, RestoreManager};
//! use nfs_web_ui::storage::ConfigStore;
//!
//! let store = Arc::new(ConfigStore::new(paths.exports_file()));
//! let backups = Arc::new(BackupManager::new(paths.backup_dir().clone(), store.clone(), 10));
//!
//! let id = backups.snapshot()?;
//!
//! // Later, roll back
//! let restore = RestoreManager::new(store, backups);
//! println!("{}", restore.restore(&id)?.summary());
//! ```

mod manager;
mod restore;

pub use manager::{is_backup_filename, BackupInfo, BackupManager, BACKUP_EXTENSION, BACKUP_PREFIX};
pub use restore::{RestoreManager, RestoreResult, ValidationResult};
