//! Audit log command

use crate::audit::AuditLogger;
use crate::config::ServerPaths;
use crate::error::ExportsResult;

/// Print the most recent audit entries, oldest first
pub fn handle_audit_command(paths: &ServerPaths, limit: usize) -> ExportsResult<()> {
    let logger = AuditLogger::new(paths.audit_log());
    let entries = logger.read_recent(limit)?;

    if entries.is_empty() {
        println!("No audit entries found.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry.format_human_readable());
    }

    println!();
    println!(
        "Showing {} entries from {}",
        entries.len(),
        logger.path().display()
    );
    Ok(())
}
