//! Snapshot display formatting

use chrono::{DateTime, Utc};
use tabled::{Table, Tabled};

use crate::backup::BackupInfo;

#[derive(Tabled)]
struct BackupRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "FILENAME")]
    filename: String,
    #[tabled(rename = "AGE")]
    age: String,
    #[tabled(rename = "SIZE")]
    size: String,
}

/// Format snapshots as a table, newest first as given
pub fn format_backup_list(backups: &[BackupInfo], now: DateTime<Utc>) -> String {
    let rows = backups.iter().enumerate().map(|(i, backup)| BackupRow {
        index: i + 1,
        filename: backup.filename.clone(),
        age: format_duration(now.signed_duration_since(backup.created_at)),
        size: format_size(backup.size_bytes),
    });

    Table::new(rows).to_string()
}

/// Format a duration in human-readable form
pub fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    let months = days / 30;
    format!("{}mo", months)
}

/// Format a file size in human-readable form
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(chrono::Duration::seconds(42)), "42s");
        assert_eq!(format_duration(chrono::Duration::minutes(5)), "5m");
        assert_eq!(format_duration(chrono::Duration::hours(3)), "3h");
        assert_eq!(format_duration(chrono::Duration::days(2)), "2d");
        assert_eq!(format_duration(chrono::Duration::days(90)), "3mo");
    }

    #[test]
    fn test_backup_table() {
        let now = Utc::now();
        let backups = vec![BackupInfo {
            filename: "exports-2026-10-17T09-05-03-042Z.bak".into(),
            path: PathBuf::from("/tmp/exports-2026-10-17T09-05-03-042Z.bak"),
            created_at: now - chrono::Duration::hours(2),
            size_bytes: 300,
        }];

        let table = format_backup_list(&backups, now);
        assert!(table.contains("exports-2026-10-17T09-05-03-042Z.bak"));
        assert!(table.contains("2h"));
        assert!(table.contains("300 B"));
    }
}
