//! Storage layer for nfs-web-ui
//!
//! Provides the exports document store with atomic writes, lenient
//! validation-on-load and a per-path write lock.

pub mod config_store;
pub mod file_io;

pub use config_store::{parse_document, ConfigStore, LoadedConfig};
pub use file_io::{read_bytes_optional, write_bytes_atomic, write_json_atomic};
