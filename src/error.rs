//! Custom error types for nfs-web-ui
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for export and backup operations
#[derive(Error, Debug)]
pub enum ExportsError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Malformed path, address or permission
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Snapshot could not be taken; the mutation did not proceed
    #[error("Backup error: {0}")]
    Backup(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Missing, invalid or expired credentials
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl ExportsError {
    /// Create a "not found" error for exports
    pub fn export_not_found(path: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Export",
            identifier: path.into(),
        }
    }

    /// Create a "not found" error for a client of an export
    pub fn client_not_found(ip: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Client",
            identifier: ip.into(),
        }
    }

    /// Create a "not found" error for snapshots
    pub fn backup_not_found(filename: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: filename.into(),
        }
    }

    /// Create a "duplicate" error for an export path
    pub fn duplicate_export(path: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: "Export",
            identifier: path.into(),
        }
    }

    /// Create a "duplicate" error for a client address
    pub fn duplicate_client(ip: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: "Client",
            identifier: ip.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a duplicate path / duplicate client error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

impl From<std::io::Error> for ExportsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ExportsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for export and backup operations
pub type ExportsResult<T> = Result<T, ExportsError>;
