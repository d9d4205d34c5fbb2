//! Export CLI commands
//!
//! Read-only views of the live configuration; changes go through the API.

use clap::Subcommand;

use crate::config::ServerPaths;
use crate::display::{format_export_details, format_export_list};
use crate::error::{ExportsError, ExportsResult};
use crate::storage::ConfigStore;

/// Export subcommands
#[derive(Subcommand)]
pub enum ExportCommands {
    /// List all exports
    List {
        /// Print the validated document as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single export
    Show {
        /// Export path
        path: String,
    },
}

/// Handle an export command
pub fn handle_export_command(paths: &ServerPaths, cmd: ExportCommands) -> ExportsResult<()> {
    let store = ConfigStore::new(paths.exports_file());
    let loaded = store.load()?;

    match cmd {
        ExportCommands::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&loaded.document.exports)?);
            } else {
                println!("{}", format_export_list(&loaded.document.exports));
            }

            if !loaded.warnings.is_empty() {
                eprintln!();
                eprintln!("Warnings:");
                for warning in &loaded.warnings {
                    eprintln!("  - {}", warning);
                }
            }
        }

        ExportCommands::Show { path } => {
            let export = loaded
                .document
                .find(&path)
                .ok_or_else(|| ExportsError::export_not_found(&path))?;
            print!("{}", format_export_details(export));
        }
    }

    Ok(())
}
