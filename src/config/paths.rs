//! Path management for nfs-web-ui
//!
//! Resolves the configuration directory (live exports document, settings,
//! audit log) and the backup directory.
//!
//! ## Path Resolution Order
//!
//! 1. Explicit directories passed on the command line
//! 2. `CONFIG_DIR` / `BACKUP_DIR` environment variables
//! 3. `/etc/nfs-web-ui` and `/var/backups/nfs-web-ui`

use std::path::PathBuf;

use crate::error::ExportsError;

/// Default configuration directory
pub const DEFAULT_CONFIG_DIR: &str = "/etc/nfs-web-ui";

/// Default backup directory
pub const DEFAULT_BACKUP_DIR: &str = "/var/backups/nfs-web-ui";

/// Manages all paths used by nfs-web-ui
#[derive(Debug, Clone)]
pub struct ServerPaths {
    config_dir: PathBuf,
    backup_dir: PathBuf,
}

impl ServerPaths {
    /// Resolve paths from the environment, falling back to the system defaults
    pub fn from_env() -> Self {
        let config_dir = std::env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR));
        let backup_dir = std::env::var("BACKUP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_BACKUP_DIR));

        Self {
            config_dir,
            backup_dir,
        }
    }

    /// Create ServerPaths with explicit directories
    pub fn new(config_dir: PathBuf, backup_dir: PathBuf) -> Self {
        Self {
            config_dir,
            backup_dir,
        }
    }

    /// Create ServerPaths rooted in a single directory (useful for testing)
    ///
    /// Lays out `<base>/config` and `<base>/backups`.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            config_dir: base_dir.join("config"),
            backup_dir: base_dir.join("backups"),
        }
    }

    /// Get the configuration directory
    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    /// Get the backup directory
    pub fn backup_dir(&self) -> &PathBuf {
        &self.backup_dir
    }

    /// Get the path to the live exports document
    pub fn exports_file(&self) -> PathBuf {
        self.config_dir.join("exports.json")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.config_dir.join("audit.log")
    }

    /// Ensure the configuration and backup directories exist
    pub fn ensure_directories(&self) -> Result<(), ExportsError> {
        std::fs::create_dir_all(&self.config_dir).map_err(|e| {
            ExportsError::Io(format!("Failed to create config directory: {}", e))
        })?;

        std::fs::create_dir_all(&self.backup_dir).map_err(|e| {
            ExportsError::Io(format!("Failed to create backup directory: {}", e))
        })?;

        Ok(())
    }
}
