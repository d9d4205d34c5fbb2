//! Configuration module for nfs-web-ui
//!
//! This module provides configuration management including:
//! - Configuration and backup directory resolution
//! - Server settings persistence with environment overrides

pub mod paths;
pub mod settings;

pub use paths::ServerPaths;
pub use settings::Settings;
