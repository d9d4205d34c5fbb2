//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod audit;
pub mod backup;
pub mod exports;
pub mod serve;

pub use audit::handle_audit_command;
pub use backup::{handle_backup_command, BackupCommands};
pub use exports::{handle_export_command, ExportCommands};
pub use serve::{serve, ServeOptions};

use crate::auth::hash_password;
use crate::config::{ServerPaths, Settings};
use crate::error::{ExportsError, ExportsResult};

/// Actor recorded in the audit log for CLI changes
pub fn cli_actor() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    format!("cli:{}", user)
}

/// Print an Argon2 hash for `ADMIN_PASSWORD_HASH`
///
/// Prompts twice when no password is given on the command line.
pub fn handle_hash_password(password: Option<String>) -> ExportsResult<()> {
    let password = match password {
        Some(password) => password,
        None => {
            let first = rpassword::prompt_password("Password: ")
                .map_err(|e| ExportsError::Io(format!("Failed to read password: {}", e)))?;
            let second = rpassword::prompt_password("Confirm password: ")
                .map_err(|e| ExportsError::Io(format!("Failed to read password: {}", e)))?;
            if first != second {
                return Err(ExportsError::Validation("Passwords do not match".into()));
            }
            first
        }
    };

    if password.is_empty() {
        return Err(ExportsError::Validation("Password cannot be empty".into()));
    }

    println!("{}", hash_password(&password)?);
    Ok(())
}

/// Print resolved paths and effective settings
pub fn handle_config_command(paths: &ServerPaths, settings: &Settings) {
    println!("nfs-web-ui Configuration");
    println!("========================");
    println!("Config directory: {}", paths.config_dir().display());
    println!("Exports file:     {}", paths.exports_file().display());
    println!("Settings file:    {}", paths.settings_file().display());
    println!("Audit log:        {}", paths.audit_log().display());
    println!("Backup directory: {}", paths.backup_dir().display());
    println!();
    println!("Settings:");
    println!("  Max backups:        {}", settings.max_backups);
    println!("  Settle delay:       {} ms", settings.settle_delay_ms);
    println!("  Status timeout:     {} s", settings.status_timeout_secs);
    println!("  Admin username:     {}", settings.admin_username);
    println!("  Admin password:     {}", describe_password(settings));
    println!(
        "  JWT secret:         {}",
        if settings.jwt_secret.is_some() {
            "configured"
        } else {
            "generated at startup"
        }
    );
    println!("  Token lifetime:     {} h", settings.token_ttl_hours);
    println!("  Require paths:      {}", settings.require_existing_paths);
}

fn describe_password(settings: &Settings) -> &'static str {
    match (&settings.admin_password_hash, &settings.admin_password) {
        (Some(_), _) => "argon2 hash",
        (None, Some(_)) => "plaintext (hashed at startup)",
        (None, None) => "DEFAULT (change in production!)",
    }
}
