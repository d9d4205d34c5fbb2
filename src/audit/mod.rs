//! Audit logging for nfs-web-ui
//!
//! Every committed mutation of the exports document is appended to a
//! line-delimited JSON journal next to the document, together with the
//! snapshot taken before it.
//!
//! # Example
//!
//! ```rust,ignore
//! use nfs_web_ui::audit::{AuditEntry, AuditLogger, EntityType};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//!
//! let entry = AuditEntry::create(EntityType::Export, &export.path, &export)
//!     .with_actor("admin")
//!     .with_backup(backup_id);
//! logger.record(&entry);
//! ```

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
