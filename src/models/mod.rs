//! Core data models for nfs-web-ui
//!
//! This module contains the data structures of the exports domain: the
//! configuration document, exports, clients and the input predicates that
//! guard them.

pub mod document;
pub mod export;
pub mod validation;

pub use document::{format_timestamp, ExportsDocument, LAST_MODIFIED};
pub use export::{Client, ClientSpec, Export, ExportValidationError, Permission};
pub use validation::{is_valid_address, is_valid_path, is_valid_permission};
