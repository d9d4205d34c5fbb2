//! nfs-web-ui - NFS export management over HTTP
//!
//! This library maintains a JSON document describing NFS exports (a path
//! plus the clients allowed to mount it) and exposes it through an
//! authenticated HTTP API and a small CLI. Every mutation and every restore
//! is preceded by a timestamped snapshot of the live document.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Directory resolution and server settings
//! - `error`: Custom error types
//! - `models`: The exports document, exports and clients
//! - `storage`: Atomic JSON storage with validation-on-load
//! - `backup`: Snapshot creation, retention and restore
//! - `audit`: Append-only change journal
//! - `services`: Export, backup and host status operations
//! - `auth`: Password verification and bearer tokens
//! - `api`: The axum HTTP layer
//! - `cli`: Command handlers
//! - `display`: Terminal tables
//!
//! # Example
//!
//! ```rust,ignore
//! use nfs_web_ui::config::{ServerPaths, Settings};
//! use nfs_web_ui::services::Services;
//!
//! let paths = ServerPaths::from_env();
//! let settings = Settings::load(&paths)?;
//! let services = Services::open(&paths, &settings)?;
//! let loaded = services.exports.list()?;
//! ```

pub mod api;
pub mod audit;
pub mod auth;
pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{ExportsError, ExportsResult};
