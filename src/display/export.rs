//! Export display formatting

use tabled::{Table, Tabled};

use crate::models::Export;

#[derive(Tabled)]
struct ExportRow {
    #[tabled(rename = "PATH")]
    path: String,
    #[tabled(rename = "CLIENTS")]
    clients: String,
}

/// Format a list of exports as a table
pub fn format_export_list(exports: &[Export]) -> String {
    if exports.is_empty() {
        return "No exports configured.".to_string();
    }

    let rows = exports.iter().map(|export| ExportRow {
        path: export.path.clone(),
        clients: export
            .clients
            .iter()
            .map(|c| format!("{}({})", c.ip, c.permission))
            .collect::<Vec<_>>()
            .join(" "),
    });

    Table::new(rows).to_string()
}

/// Format a single export with one client per line
pub fn format_export_details(export: &Export) -> String {
    let mut output = format!("Export: {}\n", export.path);
    output.push_str(&format!("Clients ({}):\n", export.clients.len()));
    for client in &export.clients {
        output.push_str(&format!("  {:<18} {}\n", client.ip, client.permission));
    }

    if !export.metadata.is_empty() {
        output.push_str("Metadata:\n");
        for (key, value) in &export.metadata {
            output.push_str(&format!("  {}: {}\n", key, value));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, Permission};

    #[test]
    fn test_empty_list() {
        assert_eq!(format_export_list(&[]), "No exports configured.");
    }

    #[test]
    fn test_list_contains_rows() {
        let exports = vec![Export::new(
            "/srv/nfs",
            vec![
                Client::new("10.0.0.1", Permission::Rw),
                Client::new("10.0.1.0/24", Permission::Ro),
            ],
        )];

        let table = format_export_list(&exports);
        assert!(table.contains("PATH"));
        assert!(table.contains("/srv/nfs"));
        assert!(table.contains("10.0.0.1(rw) 10.0.1.0/24(ro)"));
    }

    #[test]
    fn test_details() {
        let export = Export::new("/srv/nfs", vec![Client::new("10.0.0.1", Permission::Ro)]);
        let details = format_export_details(&export);
        assert!(details.starts_with("Export: /srv/nfs"));
        assert!(details.contains("Clients (1):"));
    }
}
