//! Request handlers
//!
//! Handlers are thin: they decode the request, run the matching service
//! operation on the blocking pool and shape the JSON response.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backup::BackupInfo;
use crate::error::ExportsResult;
use crate::models::{ClientSpec, Export};
use crate::services::{HostStatus, MutationOutcome};

use super::error::ApiError;
use super::extract::AuthUser;
use super::state::AppState;

const CLIENTS_SUFFIX: &str = "/clients";

// ---- request bodies ----

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateExportRequest {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub clients: Vec<ClientSpec>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExportRequest {
    #[serde(default)]
    pub clients: Vec<ClientSpec>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveClientRequest {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub ip: String,
}

// ---- response bodies ----

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct ExportListResponse {
    pub exports: Vec<Export>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<Export>,
    pub backup: String,
}

impl MutationResponse {
    fn new(message: &str, outcome: MutationOutcome) -> Self {
        Self {
            message: message.to_string(),
            export: outcome.export,
            backup: outcome.backup,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BackupEntry {
    pub filename: String,
    pub size: u64,
    pub created: DateTime<Utc>,
    pub path: String,
}

impl From<BackupInfo> for BackupEntry {
    fn from(info: BackupInfo) -> Self {
        Self {
            path: info.path.to_string_lossy().to_string(),
            filename: info.filename,
            size: info.size_bytes,
            created: info.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BackupListResponse {
    pub backups: Vec<BackupEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreResponse {
    pub message: String,
    pub restored: String,
    pub current_backup: String,
}

#[derive(Debug, Serialize)]
pub struct ExportCounts {
    pub count: usize,
    pub warnings: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(flatten)]
    pub host: HostStatus,
    pub exports: ExportCounts,
    pub active_exports: String,
}

// ---- helpers ----

/// Run a blocking service call off the async runtime
async fn blocking<T, F>(state: &Arc<AppState>, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> ExportsResult<T> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || work(&state))
        .await
        .map_err(|e| ApiError::internal(format!("Background task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// Turn a captured URL path into an export path
///
/// The capture is already percent-decoded; a missing leading `/` is added.
fn export_path(raw: &str) -> String {
    if raw.starts_with('/') {
        raw.to_string()
    } else {
        format!("/{}", raw)
    }
}

// ---- handlers ----

pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = body?;
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username and password required"));
    }

    let username = req.username.clone();
    let valid = blocking(&state, move |state| {
        Ok(state.credentials.verify(&req.username, &req.password))
    })
    .await?;

    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = state
        .tokens
        .issue(&username)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(LoginResponse { token, username }))
}

pub async fn list_exports(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExportListResponse>, ApiError> {
    let loaded = blocking(&state, |state| state.services.exports.list()).await?;

    Ok(Json(ExportListResponse {
        exports: loaded.document.exports,
        warnings: loaded.warnings,
    }))
}

pub async fn create_export(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateExportRequest>, JsonRejection>,
) -> Result<Json<MutationResponse>, ApiError> {
    let Json(req) = body?;

    let outcome = blocking(&state, move |state| {
        state
            .services
            .exports
            .create(&req.path, &req.clients, &user.username)
    })
    .await?;

    Ok(Json(MutationResponse::new("Export created successfully", outcome)))
}

pub async fn update_export(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    body: Result<Json<UpdateExportRequest>, JsonRejection>,
) -> Result<Json<MutationResponse>, ApiError> {
    let Json(req) = body?;
    let path = export_path(&raw);

    let outcome = blocking(&state, move |state| {
        state
            .services
            .exports
            .replace_clients(&path, &req.clients, &user.username)
    })
    .await?;

    Ok(Json(MutationResponse::new("Export updated successfully", outcome)))
}

pub async fn delete_export(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<Json<MutationResponse>, ApiError> {
    let path = export_path(&raw);

    let outcome = blocking(&state, move |state| {
        state.services.exports.delete_export(&path, &user.username)
    })
    .await?;

    Ok(Json(MutationResponse::new("Export deleted successfully", outcome)))
}

/// `POST /api/exports/<path>/clients`
///
/// Shares the export catch-all route, so the `/clients` suffix is matched here.
pub async fn add_client(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    body: Result<Json<ClientSpec>, JsonRejection>,
) -> Result<Json<MutationResponse>, ApiError> {
    let path = export_path(&raw);
    let path = path
        .strip_suffix(CLIENTS_SUFFIX)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::not_found("Not found"))?;

    let Json(client) = body?;
    if client.ip.is_empty() || client.permission.is_empty() {
        return Err(ApiError::bad_request("IP and permission are required"));
    }

    let outcome = blocking(&state, move |state| {
        state
            .services
            .exports
            .add_client(&path, &client, &user.username)
    })
    .await?;

    Ok(Json(MutationResponse::new("IP address added successfully", outcome)))
}

pub async fn remove_client(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    body: Result<Json<RemoveClientRequest>, JsonRejection>,
) -> Result<Json<MutationResponse>, ApiError> {
    let Json(req) = body?;
    if req.ip.is_empty() {
        return Err(ApiError::bad_request("IP address is required"));
    }
    if req.path.is_empty() {
        return Err(ApiError::bad_request("Invalid path"));
    }
    let path = export_path(&req.path);

    let outcome = blocking(&state, move |state| {
        state
            .services
            .exports
            .remove_client(&path, &req.ip, &user.username)
    })
    .await?;

    let message = if outcome.export_deleted {
        "IP address removed and export deleted (no clients remaining)"
    } else {
        "IP address removed successfully"
    };
    Ok(Json(MutationResponse::new(message, outcome)))
}

pub async fn list_backups(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<BackupListResponse>, ApiError> {
    let backups = blocking(&state, |state| state.services.backups.list()).await?;

    Ok(Json(BackupListResponse {
        backups: backups.into_iter().map(BackupEntry::from).collect(),
    }))
}

pub async fn restore_backup(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<RestoreResponse>, ApiError> {
    let result = blocking(&state, move |state| {
        state.services.backups.restore(&filename, &user.username)
    })
    .await?;

    Ok(Json(RestoreResponse {
        message: "Backup restored successfully".to_string(),
        restored: result.restored,
        current_backup: result.pre_restore_backup,
    }))
}

pub async fn delete_backup(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    blocking(&state, move |state| {
        state.services.backups.delete(&filename, &user.username)
    })
    .await?;

    Ok(Json(MessageResponse {
        message: "Backup deleted successfully".to_string(),
    }))
}

pub async fn get_status(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let host = state.status.host_status().await;
    let loaded = blocking(&state, |state| state.services.exports.list()).await?;

    let count = loaded.document.len();
    Ok(Json(StatusResponse {
        host,
        exports: ExportCounts {
            count,
            warnings: loaded.warnings.len(),
        },
        active_exports: format!("{} exports configured", count),
    }))
}
