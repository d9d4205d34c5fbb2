//! Configuration document model
//!
//! The single persisted aggregate: every export plus document metadata.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::export::Export;

/// Metadata key stamped on every save
pub const LAST_MODIFIED: &str = "lastModified";

/// The exports configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportsDocument {
    /// Exports in insertion order; paths are unique
    #[serde(default)]
    pub exports: Vec<Export>,

    /// Document metadata (`lastModified`, `version`, ...)
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl ExportsDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty document written when a snapshot cannot be parsed during restore
    pub fn restored_placeholder(now: DateTime<Utc>) -> Self {
        let stamp = format_timestamp(now);
        let mut metadata = Map::new();
        metadata.insert("created".into(), Value::String(stamp.clone()));
        metadata.insert("version".into(), Value::String("1.0".into()));
        metadata.insert(
            "description".into(),
            Value::String("NFS Exports restored from backup".into()),
        );
        metadata.insert(LAST_MODIFIED.into(), Value::String(stamp));

        Self {
            exports: Vec::new(),
            metadata,
        }
    }

    /// Find an export by path
    pub fn find(&self, path: &str) -> Option<&Export> {
        self.exports.iter().find(|e| e.path == path)
    }

    /// Find an export by path for mutation
    pub fn find_mut(&mut self, path: &str) -> Option<&mut Export> {
        self.exports.iter_mut().find(|e| e.path == path)
    }

    /// Position of an export in the document
    pub fn position(&self, path: &str) -> Option<usize> {
        self.exports.iter().position(|e| e.path == path)
    }

    /// Check whether an export with this path exists
    pub fn contains(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    /// Number of exports
    pub fn len(&self) -> usize {
        self.exports.len()
    }

    /// Whether the document has no exports
    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }

    /// Stamp `metadata.lastModified`
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.metadata
            .insert(LAST_MODIFIED.into(), Value::String(format_timestamp(now)));
    }

    /// The `lastModified` stamp, if present and well-formed
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.metadata
            .get(LAST_MODIFIED)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// ISO-8601 with milliseconds and a `Z` suffix
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, Permission};
    use chrono::TimeZone;

    #[test]
    fn test_lookup() {
        let mut doc = ExportsDocument::new();
        doc.exports.push(Export::new(
            "/srv/a",
            vec![Client::new("10.0.0.1", Permission::Ro)],
        ));
        doc.exports.push(Export::new(
            "/srv/b",
            vec![Client::new("10.0.0.2", Permission::Rw)],
        ));

        assert!(doc.contains("/srv/a"));
        assert_eq!(doc.position("/srv/b"), Some(1));
        assert!(doc.find("/srv/c").is_none());
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_touch() {
        let mut doc = ExportsDocument::new();
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        doc.touch(now);

        assert_eq!(doc.metadata[LAST_MODIFIED], "2026-01-02T03:04:05.000Z");
        assert_eq!(doc.last_modified(), Some(now));
    }

    #[test]
    fn test_restored_placeholder() {
        let doc = ExportsDocument::restored_placeholder(Utc::now());
        assert!(doc.is_empty());
        assert_eq!(doc.metadata["version"], "1.0");
        assert!(doc.last_modified().is_some());
    }

    #[test]
    fn test_missing_fields_default() {
        let doc: ExportsDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.is_empty());
        assert!(doc.metadata.is_empty());
    }
}
