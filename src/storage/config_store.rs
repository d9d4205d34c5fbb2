//! Exports document store
//!
//! Owns the live `exports.json`: lenient load with per-record diagnostics,
//! atomic save, and the write lock that serializes read-modify-write cycles.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ExportsError, ExportsResult};
use crate::models::{format_timestamp, is_valid_path, Client, Export, ExportsDocument, LAST_MODIFIED};

use super::file_io::{read_bytes_optional, write_json_atomic};

/// Diagnostic for an absent or unparsable document
pub const DOCUMENT_UNREADABLE: &str = "Configuration file not found or invalid";

/// Diagnostic for a document without an `exports` array
pub const DOCUMENT_INVALID: &str = "Configuration file is invalid or empty";

/// A loaded document together with everything dropped while loading it
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub document: ExportsDocument,
    pub warnings: Vec<String>,
}

/// Store for the live exports document
pub struct ConfigStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl ConfigStore {
    /// Create a store for the document at `path`
    ///
    /// Stores opened on the same path share one write lock.
    pub fn new(path: PathBuf) -> Self {
        let write_lock = lock_for(&path);
        Self { path, write_lock }
    }

    /// Path of the live document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the write lock for a read-modify-write cycle
    pub fn lock(&self) -> ExportsResult<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| ExportsError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Raw bytes of the live document, `None` when it doesn't exist yet
    pub fn read_raw(&self) -> ExportsResult<Option<Vec<u8>>> {
        read_bytes_optional(&self.path)
    }

    /// Load and validate the document
    ///
    /// A missing or unparsable file yields an empty document plus a
    /// diagnostic; invalid records are dropped with a diagnostic each. Only
    /// I/O failures other than "file absent" are errors.
    pub fn load(&self) -> ExportsResult<LoadedConfig> {
        let loaded = match self.read_raw()? {
            Some(bytes) => parse_document(&bytes),
            None => LoadedConfig {
                document: ExportsDocument::new(),
                warnings: vec![DOCUMENT_UNREADABLE.to_string()],
            },
        };

        if !loaded.warnings.is_empty() {
            warn!(
                path = %self.path.display(),
                warnings = ?loaded.warnings,
                "exports document loaded with warnings"
            );
        }

        Ok(loaded)
    }

    /// Stamp `lastModified` and write the document atomically
    pub fn save(&self, document: &mut ExportsDocument) -> ExportsResult<()> {
        document.touch(Utc::now());
        write_json_atomic(&self.path, document)?;
        debug!(path = %self.path.display(), exports = document.len(), "exports document saved");
        Ok(())
    }

    /// Write an arbitrary JSON object as the document, bypassing validation
    ///
    /// Used by restore; `metadata.lastModified` is still stamped.
    pub fn save_raw(&self, mut root: Map<String, Value>) -> ExportsResult<()> {
        let stamp = Value::String(format_timestamp(Utc::now()));
        match root.get_mut("metadata") {
            Some(Value::Object(metadata)) => {
                metadata.insert(LAST_MODIFIED.into(), stamp);
            }
            _ => {
                let mut metadata = Map::new();
                metadata.insert(LAST_MODIFIED.into(), stamp);
                root.insert("metadata".into(), Value::Object(metadata));
            }
        }

        write_json_atomic(&self.path, &Value::Object(root))
    }
}

/// Parse document bytes, keeping every valid record
pub fn parse_document(bytes: &[u8]) -> LoadedConfig {
    let value: Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(_) => {
            return LoadedConfig {
                document: ExportsDocument::new(),
                warnings: vec![DOCUMENT_UNREADABLE.to_string()],
            }
        }
    };

    let Some(root) = value.as_object() else {
        return LoadedConfig {
            document: ExportsDocument::new(),
            warnings: vec![DOCUMENT_INVALID.to_string()],
        };
    };

    let mut document = ExportsDocument {
        exports: Vec::new(),
        metadata: root
            .get("metadata")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
    };

    let Some(records) = root.get("exports").and_then(Value::as_array) else {
        return LoadedConfig {
            document,
            warnings: vec![DOCUMENT_INVALID.to_string()],
        };
    };

    let mut warnings = Vec::new();
    let mut seen = HashSet::new();

    for (index, record) in records.iter().enumerate() {
        let number = index + 1;
        let Some(export) = parse_export(record, number, &mut warnings) else {
            continue;
        };

        if !seen.insert(export.path.clone()) {
            warnings.push(format!("Export {}: Duplicate path: {}", number, export.path));
            continue;
        }

        document.exports.push(export);
    }

    LoadedConfig { document, warnings }
}

fn parse_export(record: &Value, number: usize, warnings: &mut Vec<String>) -> Option<Export> {
    let path = record
        .get("path")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty());
    let clients = record.get("clients").and_then(Value::as_array);

    let (Some(path), Some(clients)) = (path, clients) else {
        warnings.push(format!("Export {}: Invalid export configuration", number));
        return None;
    };

    if !is_valid_path(path) {
        warnings.push(format!("Export {}: Invalid path: {}", number, path));
        return None;
    }

    let mut valid_clients = Vec::new();
    for client in clients {
        let ip = non_empty_str(client, "ip");
        let permission = non_empty_str(client, "permission");

        let (Some(ip), Some(permission)) = (ip, permission) else {
            warnings.push(format!("Export {}: Invalid client configuration", number));
            continue;
        };

        match Client::parse(ip, permission) {
            Ok(client) => valid_clients.push(client),
            Err(e) => warnings.push(format!("Export {}: {}", number, e)),
        }
    }

    if valid_clients.is_empty() {
        warnings.push(format!("Export {}: No valid clients found", number));
        return None;
    }

    let mut export = Export::new(path, valid_clients);
    export.metadata = record
        .get("metadata")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    Some(export)
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Process-wide registry of write locks keyed by document path
fn lock_for(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

    let registry = LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut registry = match registry.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    registry
        .entry(path.to_path_buf())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}
