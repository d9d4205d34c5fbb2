//! Audit entry data structures
//!
//! Defines the operations and entity kinds recorded in the mutation journal
//! and the entry format itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Entity was created
    Create,
    /// Entity was updated
    Update,
    /// Entity was deleted
    Delete,
    /// Live document was overwritten from a snapshot
    Restore,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
            Operation::Restore => write!(f, "RESTORE"),
        }
    }
}

/// Types of entities that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Export,
    Client,
    Backup,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Export => write!(f, "Export"),
            EntityType::Client => write!(f, "Client"),
            EntityType::Backup => write!(f, "Backup"),
        }
    }
}

/// A single audit log entry
///
/// Records one committed mutation together with the snapshot taken before it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    /// Type of operation performed
    pub operation: Operation,

    /// Type of entity affected
    pub entity_type: EntityType,

    /// Export path, `path ip` for a client, or snapshot filename
    pub entity_id: String,

    /// Authenticated user who made the change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,

    /// Snapshot taken before the change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,

    /// JSON representation of the entity before the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    /// JSON representation of the entity after the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,
}

impl AuditEntry {
    fn new(operation: Operation, entity_type: EntityType, entity_id: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id: entity_id.into(),
            actor: None,
            backup: None,
            before: None,
            after: None,
        }
    }

    /// Create a new audit entry for a create operation
    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity: &T,
    ) -> Self {
        Self {
            after: serde_json::to_value(entity).ok(),
            ..Self::new(Operation::Create, entity_type, entity_id)
        }
    }

    /// Create a new audit entry for an update operation
    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        before: &T,
        after: &T,
    ) -> Self {
        Self {
            before: serde_json::to_value(before).ok(),
            after: serde_json::to_value(after).ok(),
            ..Self::new(Operation::Update, entity_type, entity_id)
        }
    }

    /// Create a new audit entry for a delete operation
    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity: &T,
    ) -> Self {
        Self {
            before: serde_json::to_value(entity).ok(),
            ..Self::new(Operation::Delete, entity_type, entity_id)
        }
    }

    /// Create a new audit entry for a restore from `filename`
    pub fn restore(filename: impl Into<String>) -> Self {
        Self::new(Operation::Restore, EntityType::Backup, filename)
    }

    /// Attach the acting user
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Attach the pre-mutation snapshot
    pub fn with_backup(mut self, backup: impl Into<String>) -> Self {
        self.backup = Some(backup.into());
        self
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(actor) = &self.actor {
            output.push_str(&format!(" by {}", actor));
        }

        if let Some(backup) = &self.backup {
            output.push_str(&format!("\n  Backup: {}", backup));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Create.to_string(), "CREATE");
        assert_eq!(Operation::Delete.to_string(), "DELETE");
        assert_eq!(Operation::Restore.to_string(), "RESTORE");
    }

    #[test]
    fn test_create_entry() {
        let data = json!({"path": "/srv/nfs", "clients": []});
        let entry = AuditEntry::create(EntityType::Export, "/srv/nfs", &data);

        assert_eq!(entry.operation, Operation::Create);
        assert_eq!(entry.entity_type, EntityType::Export);
        assert!(entry.before.is_none());
        assert!(entry.after.is_some());
    }

    #[test]
    fn test_update_entry() {
        let before = json!({"clients": [{"ip": "10.0.0.1", "permission": "ro"}]});
        let after = json!({"clients": [{"ip": "10.0.0.1", "permission": "rw"}]});

        let entry = AuditEntry::update(EntityType::Export, "/srv/nfs", &before, &after);

        assert_eq!(entry.operation, Operation::Update);
        assert!(entry.before.is_some());
        assert!(entry.after.is_some());
    }

    #[test]
    fn test_delete_entry() {
        let entry = AuditEntry::delete(EntityType::Client, "/srv/nfs 10.0.0.1", &json!({"ip": "10.0.0.1"}));

        assert_eq!(entry.operation, Operation::Delete);
        assert!(entry.before.is_some());
        assert!(entry.after.is_none());
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let entry = AuditEntry::restore("exports-2026-10-17T09-05-03-042Z.bak");

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["operation"], "restore");
        assert_eq!(json["entity_type"], "backup");
        assert!(json.get("actor").is_none());
        assert!(json.get("before").is_none());
    }

    #[test]
    fn test_human_readable_format() {
        let entry = AuditEntry::create(EntityType::Export, "/srv/nfs", &json!({}))
            .with_actor("admin")
            .with_backup("exports-2026-10-17T09-05-03-042Z.bak");

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("CREATE Export /srv/nfs by admin"));
        assert!(formatted.contains("Backup: exports-2026-10-17T09-05-03-042Z.bak"));
    }
}
