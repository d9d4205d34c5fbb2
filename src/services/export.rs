//! Export service
//!
//! Runs every export mutation through the same cycle: validate input,
//! snapshot, load, mutate, save. The cycle runs under the store's write
//! lock; the settle delay is observed once the lock is released.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::backup::BackupManager;
use crate::config::Settings;
use crate::error::{ExportsError, ExportsResult};
use crate::models::{
    is_valid_address, is_valid_path, Client, ClientSpec, Export, ExportValidationError,
    ExportsDocument,
};
use crate::storage::{ConfigStore, LoadedConfig};

use super::settle;

/// Result of a committed export mutation
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    /// The export as it stands after the mutation, `None` if it was removed
    pub export: Option<Export>,
    /// Snapshot taken before the mutation
    pub backup: String,
    /// Whether the export was removed, directly or by losing its last client
    pub export_deleted: bool,
}

/// Service for export management
pub struct ExportService {
    store: Arc<ConfigStore>,
    backups: Arc<BackupManager>,
    audit: Arc<AuditLogger>,
    settle_delay: Duration,
    require_existing_paths: bool,
}

impl ExportService {
    /// Create a new export service
    pub fn new(
        store: Arc<ConfigStore>,
        backups: Arc<BackupManager>,
        audit: Arc<AuditLogger>,
        settings: &Settings,
    ) -> Self {
        Self {
            store,
            backups,
            audit,
            settle_delay: settings.settle_delay(),
            require_existing_paths: settings.require_existing_paths,
        }
    }

    /// Load the current exports together with load diagnostics
    pub fn list(&self) -> ExportsResult<LoadedConfig> {
        self.store.load()
    }

    /// Get a single export by path
    pub fn get(&self, path: &str) -> ExportsResult<Option<Export>> {
        Ok(self.store.load()?.document.find(path).cloned())
    }

    /// Create a new export
    pub fn create(
        &self,
        path: &str,
        clients: &[ClientSpec],
        actor: &str,
    ) -> ExportsResult<MutationOutcome> {
        validate_path(path)?;
        let clients = validate_clients(clients)?;

        if self.require_existing_paths && !Path::new(path).exists() {
            return Err(ExportsError::NotFound {
                entity_type: "Directory",
                identifier: path.to_string(),
            });
        }

        let (backup, export) = self.mutate(|document| {
            if document.contains(path) {
                return Err(ExportsError::duplicate_export(path));
            }
            let export = Export::new(path, clients);
            document.exports.push(export.clone());
            Ok(export)
        })?;

        info!(path = %path, clients = export.clients.len(), backup = %backup, "export created");
        self.audit.record(
            &AuditEntry::create(EntityType::Export, path, &export)
                .with_actor(actor)
                .with_backup(&backup),
        );

        Ok(MutationOutcome {
            export: Some(export),
            backup,
            export_deleted: false,
        })
    }

    /// Replace an export's client list wholesale
    pub fn replace_clients(
        &self,
        path: &str,
        clients: &[ClientSpec],
        actor: &str,
    ) -> ExportsResult<MutationOutcome> {
        validate_path(path)?;
        let clients = validate_clients(clients)?;

        let (backup, (before, after)) = self.mutate(|document| {
            let export = document
                .find_mut(path)
                .ok_or_else(|| ExportsError::export_not_found(path))?;
            let before = export.clone();
            export.clients = clients;
            Ok((before, export.clone()))
        })?;

        info!(path = %path, clients = after.clients.len(), backup = %backup, "export updated");
        self.audit.record(
            &AuditEntry::update(EntityType::Export, path, &before, &after)
                .with_actor(actor)
                .with_backup(&backup),
        );

        Ok(MutationOutcome {
            export: Some(after),
            backup,
            export_deleted: false,
        })
    }

    /// Delete an export
    pub fn delete_export(&self, path: &str, actor: &str) -> ExportsResult<MutationOutcome> {
        validate_path(path)?;

        let (backup, removed) = self.mutate(|document| {
            let index = document
                .position(path)
                .ok_or_else(|| ExportsError::export_not_found(path))?;
            Ok(document.exports.remove(index))
        })?;

        info!(path = %path, backup = %backup, "export deleted");
        self.audit.record(
            &AuditEntry::delete(EntityType::Export, path, &removed)
                .with_actor(actor)
                .with_backup(&backup),
        );

        Ok(MutationOutcome {
            export: None,
            backup,
            export_deleted: true,
        })
    }

    /// Add a single client to an existing export
    pub fn add_client(
        &self,
        path: &str,
        client: &ClientSpec,
        actor: &str,
    ) -> ExportsResult<MutationOutcome> {
        validate_path(path)?;
        let client = client.to_client().map_err(validation_error)?;

        let (backup, export) = self.mutate(|document| {
            let export = document
                .find_mut(path)
                .ok_or_else(|| ExportsError::export_not_found(path))?;
            if export.has_client(&client.ip) {
                return Err(ExportsError::duplicate_client(&client.ip));
            }
            export.clients.push(client.clone());
            Ok(export.clone())
        })?;

        info!(path = %path, ip = %client.ip, backup = %backup, "client added");
        self.audit.record(
            &AuditEntry::create(EntityType::Client, client_id(path, &client.ip), &client)
                .with_actor(actor)
                .with_backup(&backup),
        );

        Ok(MutationOutcome {
            export: Some(export),
            backup,
            export_deleted: false,
        })
    }

    /// Remove a single client; an export left without clients is removed too
    pub fn remove_client(&self, path: &str, ip: &str, actor: &str) -> ExportsResult<MutationOutcome> {
        validate_path(path)?;
        if !is_valid_address(ip) {
            return Err(validation_error(ExportValidationError::InvalidAddress(
                ip.to_string(),
            )));
        }

        let (backup, (removed, remaining)) = self.mutate(|document| {
            remove_client_from(document, path, ip)
        })?;

        info!(
            path = %path,
            ip = %ip,
            export_deleted = remaining.is_none(),
            backup = %backup,
            "client removed"
        );
        self.audit.record(
            &AuditEntry::delete(EntityType::Client, client_id(path, ip), &removed)
                .with_actor(actor)
                .with_backup(&backup),
        );

        Ok(MutationOutcome {
            export_deleted: remaining.is_none(),
            export: remaining,
            backup,
        })
    }

    /// Run one read-modify-write cycle under the write lock
    ///
    /// Returns the pre-mutation snapshot id with the closure's result. The
    /// document is saved only if the closure succeeds.
    fn mutate<T, F>(&self, apply: F) -> ExportsResult<(String, T)>
    where
        F: FnOnce(&mut ExportsDocument) -> ExportsResult<T>,
    {
        let result = {
            let _guard = self.store.lock()?;

            let backup = self.backups.snapshot()?;
            let mut document = self.store.load()?.document;
            let value = apply(&mut document)?;
            self.store.save(&mut document)?;

            (backup, value)
        };

        settle(self.settle_delay);
        Ok(result)
    }
}

fn remove_client_from(
    document: &mut ExportsDocument,
    path: &str,
    ip: &str,
) -> ExportsResult<(Client, Option<Export>)> {
    let index = document
        .position(path)
        .ok_or_else(|| ExportsError::export_not_found(path))?;

    let export = &mut document.exports[index];
    let removed = export
        .remove_client(ip)
        .ok_or_else(|| ExportsError::client_not_found(ip))?;

    if export.clients.is_empty() {
        document.exports.remove(index);
        return Ok((removed, None));
    }

    Ok((removed, Some(export.clone())))
}

fn validate_path(path: &str) -> ExportsResult<()> {
    if is_valid_path(path) {
        Ok(())
    } else {
        Err(validation_error(ExportValidationError::InvalidPath(
            path.to_string(),
        )))
    }
}

/// Validate a full client list: non-empty, every entry valid, no repeated address
fn validate_clients(specs: &[ClientSpec]) -> ExportsResult<Vec<Client>> {
    if specs.is_empty() {
        return Err(validation_error(ExportValidationError::NoClients));
    }

    let mut seen = HashSet::new();
    let mut clients = Vec::with_capacity(specs.len());
    for spec in specs {
        let client = spec.to_client().map_err(validation_error)?;
        if !seen.insert(client.ip.clone()) {
            return Err(ExportsError::duplicate_client(&client.ip));
        }
        clients.push(client);
    }

    Ok(clients)
}

fn validation_error(e: ExportValidationError) -> ExportsError {
    ExportsError::Validation(e.to_string())
}

fn client_id(path: &str, ip: &str) -> String {
    format!("{} {}", path, ip)
}
