//! Export and client models
//!
//! An export shares one filesystem path with a list of clients, each with
//! its own access level.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::validation::{is_valid_address, is_valid_permission};

/// Access level granted to a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Read-only
    Ro,
    /// Read-write
    Rw,
}

impl Permission {
    /// Parse a permission string (`ro` or `rw`, exact match)
    pub fn parse(s: &str) -> Option<Self> {
        if !is_valid_permission(s) {
            return None;
        }
        match s {
            "ro" => Some(Self::Ro),
            _ => Some(Self::Rw),
        }
    }

    /// The wire form of the permission
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ro => "ro",
            Self::Rw => "rw",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client allowed to mount an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// IPv4 address or CIDR block
    pub ip: String,

    /// Access level
    pub permission: Permission,
}

impl Client {
    /// Create a client from already-validated parts
    pub fn new(ip: impl Into<String>, permission: Permission) -> Self {
        Self {
            ip: ip.into(),
            permission,
        }
    }

    /// Build a client from untrusted input
    pub fn parse(ip: &str, permission: &str) -> Result<Self, ExportValidationError> {
        if !is_valid_address(ip) {
            return Err(ExportValidationError::InvalidAddress(ip.to_string()));
        }
        let permission = Permission::parse(permission)
            .ok_or_else(|| ExportValidationError::InvalidPermission(permission.to_string()))?;
        Ok(Self::new(ip, permission))
    }
}

/// Client fields as received from a caller, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSpec {
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub permission: String,
}

impl ClientSpec {
    pub fn new(ip: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            permission: permission.into(),
        }
    }

    /// Validate into a client
    pub fn to_client(&self) -> Result<Client, ExportValidationError> {
        Client::parse(&self.ip, &self.permission)
    }
}

/// A filesystem path shared with a set of clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Export {
    /// Absolute path; the unique key of the export
    pub path: String,

    /// Clients in insertion order
    pub clients: Vec<Client>,

    /// Free-form metadata
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Export {
    /// Create a new export
    pub fn new(path: impl Into<String>, clients: Vec<Client>) -> Self {
        Self {
            path: path.into(),
            clients,
            metadata: Map::new(),
        }
    }

    /// Find a client by address
    pub fn client(&self, ip: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.ip == ip)
    }

    /// Check whether a client address is already present
    pub fn has_client(&self, ip: &str) -> bool {
        self.client(ip).is_some()
    }

    /// Remove a client by address, returning it if it was present
    pub fn remove_client(&mut self, ip: &str) -> Option<Client> {
        let index = self.clients.iter().position(|c| c.ip == ip)?;
        Some(self.clients.remove(index))
    }
}

impl fmt::Display for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clients: Vec<String> = self
            .clients
            .iter()
            .map(|c| format!("{}({})", c.ip, c.permission))
            .collect();
        write!(f, "{} {}", self.path, clients.join(" "))
    }
}

/// Validation errors for exports and clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportValidationError {
    InvalidPath(String),
    InvalidAddress(String),
    InvalidPermission(String),
    NoClients,
}

impl fmt::Display for ExportValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPath(path) => write!(f, "Invalid path: {}", path),
            Self::InvalidAddress(ip) => write!(f, "Invalid IP address: {}", ip),
            Self::InvalidPermission(p) => write!(f, "Invalid permission: {}", p),
            Self::NoClients => write!(f, "At least one client must be specified"),
        }
    }
}

impl std::error::Error for ExportValidationError {}
