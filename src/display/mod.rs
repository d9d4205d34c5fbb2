//! Display formatting for terminal output
//!
//! Tables and human-readable sizes and ages for the CLI.

pub mod backup;
pub mod export;

pub use backup::{format_backup_list, format_duration, format_size};
pub use export::{format_export_details, format_export_list};
