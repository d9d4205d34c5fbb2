//! Backup CLI commands
//!
//! Implements CLI commands for snapshot management.

use clap::Subcommand;

use crate::config::{ServerPaths, Settings};
use crate::display::{format_backup_list, format_duration, format_size};
use crate::error::{ExportsError, ExportsResult};
use crate::services::Services;

use super::cli_actor;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Snapshot the current configuration
    Create,

    /// List all available snapshots
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Restore the configuration from a snapshot
    Restore {
        /// Snapshot filename (use 'latest' for most recent)
        backup: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show information about a specific snapshot
    Info {
        /// Snapshot filename (use 'latest' for most recent)
        backup: String,
    },

    /// Delete a snapshot
    Delete {
        /// Snapshot filename
        backup: String,
    },

    /// Delete snapshots beyond the retention count
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    paths: &ServerPaths,
    settings: &Settings,
    cmd: BackupCommands,
) -> ExportsResult<()> {
    let services = Services::open(paths, settings)?;
    let backups = &services.backups;

    match cmd {
        BackupCommands::Create => {
            println!("Creating backup...");
            let info = backups.create()?;
            println!("Backup created: {}", info.filename);
            println!("Location: {}", info.path.display());
        }

        BackupCommands::List { verbose } => {
            let list = backups.list()?;

            if list.is_empty() {
                println!("No backups found.");
                println!("Create one with: nfs-web-ui backup create");
                return Ok(());
            }

            let now = chrono::Utc::now();
            if verbose {
                for (i, backup) in list.iter().enumerate() {
                    println!(
                        "{}. {}\n   Created: {}\n   Size: {}\n   Age: {}\n",
                        i + 1,
                        backup.filename,
                        backup.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        format_size(backup.size_bytes),
                        format_duration(now.signed_duration_since(backup.created_at)),
                    );
                }
            } else {
                println!("{}", format_backup_list(&list, now));
            }

            println!();
            println!(
                "Total: {} backup(s), keeping the newest {}",
                list.len(),
                settings.max_backups
            );
        }

        BackupCommands::Restore { backup, force } => {
            let filename = resolve_backup(&services, &backup)?;
            let validation = backups.inspect(&filename)?;

            println!("Backup Information");
            println!("==================");
            println!("File: {}", backups.backup_dir().join(&filename).display());
            println!("Status: {}", validation.summary());
            println!();

            if !force {
                println!("WARNING: This will overwrite the current export configuration!");
                println!("To proceed, run again with --force flag:");
                println!("  nfs-web-ui backup restore {} --force", backup);
                return Ok(());
            }

            println!("Restoring from backup...");
            let result = backups.restore(&filename, &cli_actor())?;

            println!("Restore complete!");
            println!("{}", result.summary());
        }

        BackupCommands::Info { backup } => {
            let filename = resolve_backup(&services, &backup)?;
            let validation = backups.inspect(&filename)?;
            let info = backups
                .get(&filename)?
                .ok_or_else(|| ExportsError::backup_not_found(&filename))?;

            println!("Backup Details");
            println!("==============");
            println!("File: {}", info.path.display());
            println!("Size: {}", format_size(info.size_bytes));
            println!(
                "Created: {}",
                info.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Status: {}", validation.summary());

            for warning in &validation.warnings {
                println!("  - {}", warning);
            }
        }

        BackupCommands::Delete { backup } => {
            backups.delete(&backup, &cli_actor())?;
            println!("Deleted backup: {}", backup);
        }

        BackupCommands::Prune { force } => {
            let list = backups.list()?;
            let to_delete = list.len().saturating_sub(settings.max_backups);

            if to_delete == 0 {
                println!("No backups to prune.");
                println!(
                    "Retention keeps {} backup(s); you have {}.",
                    settings.max_backups,
                    list.len()
                );
                return Ok(());
            }

            println!("Prune Summary");
            println!("=============");
            println!("Retention: {} backup(s)", settings.max_backups);
            println!("Current backups: {}", list.len());
            println!("To be deleted: {}", to_delete);
            println!();

            if !force {
                println!("To delete old backups, run again with --force flag:");
                println!("  nfs-web-ui backup prune --force");
                return Ok(());
            }

            let deleted = backups.prune()?;
            println!("Deleted {} backup(s).", deleted.len());
        }
    }

    Ok(())
}

/// Resolve a snapshot identifier to a filename
fn resolve_backup(services: &Services, backup: &str) -> ExportsResult<String> {
    if backup.eq_ignore_ascii_case("latest") {
        return services
            .backups
            .latest()?
            .map(|b| b.filename)
            .ok_or_else(|| ExportsError::backup_not_found("latest"));
    }

    Ok(backup.to_string())
}
