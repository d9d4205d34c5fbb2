//! Host status probes
//!
//! Reports NFS server state and basic host figures by shelling out to
//! standard system tools. A probe that fails or exceeds the timeout reports
//! `unknown`; status never fails as a whole.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::warn;

/// Placeholder for a probe that produced nothing usable
pub const UNKNOWN: &str = "unknown";

/// Systemd unit probed for NFS server state
pub const NFS_UNIT: &str = "nfs-kernel-server";

/// NFS server state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NfsServerStatus {
    /// `active`, `inactive`, `failed`, ... or `unknown`
    pub status: String,
    /// Whether the unit starts at boot
    pub enabled: bool,
}

/// Host figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub uptime: String,
    /// `used/total`
    pub memory: String,
    /// Root filesystem use percentage
    pub disk_usage: String,
}

/// Everything a status provider reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostStatus {
    pub nfs_server: NfsServerStatus,
    pub system: SystemStatus,
}

/// Source of host status
#[async_trait]
pub trait StatusProvider: Send + Sync {
    async fn host_status(&self) -> HostStatus;
}

/// Status provider backed by `systemctl`, `uptime`, `free` and `df`
pub struct SystemStatusProvider {
    probe_timeout: Duration,
}

impl SystemStatusProvider {
    pub fn new(probe_timeout: Duration) -> Self {
        Self { probe_timeout }
    }

    /// Run a command and return its trimmed stdout
    ///
    /// A non-zero exit still counts when something was printed
    /// (`systemctl is-active` exits 3 and prints `inactive`).
    async fn probe(&self, program: &str, args: &[&str]) -> Option<String> {
        let output = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output();

        let output = match timeout(self.probe_timeout, output).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(program, error = %e, "status probe failed");
                return None;
            }
            Err(_) => {
                warn!(program, timeout = ?self.probe_timeout, "status probe timed out");
                return None;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            warn!(program, status = %output.status, "status probe produced no output");
            return None;
        }
        Some(stdout)
    }
}

impl Default for SystemStatusProvider {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl StatusProvider for SystemStatusProvider {
    async fn host_status(&self) -> HostStatus {
        let (active, enabled, uptime, free, df) = tokio::join!(
            self.probe("systemctl", &["is-active", NFS_UNIT]),
            self.probe("systemctl", &["is-enabled", NFS_UNIT]),
            self.probe("uptime", &["-p"]),
            self.probe("free", &["-h"]),
            self.probe("df", &["-h", "/"]),
        );

        HostStatus {
            nfs_server: NfsServerStatus {
                status: active.unwrap_or_else(|| UNKNOWN.to_string()),
                enabled: enabled.as_deref() == Some("enabled"),
            },
            system: SystemStatus {
                uptime: uptime.unwrap_or_else(|| UNKNOWN.to_string()),
                memory: free
                    .as_deref()
                    .and_then(parse_memory)
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                disk_usage: df
                    .as_deref()
                    .and_then(parse_disk_usage)
                    .unwrap_or_else(|| UNKNOWN.to_string()),
            },
        }
    }
}

/// Extract `used/total` from `free -h` output
fn parse_memory(output: &str) -> Option<String> {
    let line = output.lines().find(|l| l.starts_with("Mem:"))?;
    let fields: Vec<&str> = line.split_whitespace().collect();
    let total = fields.get(1)?;
    let used = fields.get(2)?;
    Some(format!("{}/{}", used, total))
}

/// Extract the use percentage from the last line of `df -h` output
fn parse_disk_usage(output: &str) -> Option<String> {
    let line = output.lines().last()?;
    line.split_whitespace().nth(4).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_memory() {
        let output = "               total        used        free      shared  buff/cache   available\n\
                      Mem:            15Gi       4.2Gi       6.1Gi       312Mi       5.3Gi        10Gi\n\
                      Swap:          2.0Gi          0B       2.0Gi";
        assert_eq!(parse_memory(output).as_deref(), Some("4.2Gi/15Gi"));
        assert_eq!(parse_memory("garbage"), None);
    }

    #[test]
    fn test_parse_disk_usage() {
        let output = "Filesystem      Size  Used Avail Use% Mounted on\n\
                      /dev/sda1        50G   21G   27G  44% /";
        assert_eq!(parse_disk_usage(output).as_deref(), Some("44%"));
        assert_eq!(parse_disk_usage(""), None);
    }

    #[tokio::test]
    async fn test_missing_program_is_unknown() {
        let provider = SystemStatusProvider::new(Duration::from_secs(1));
        assert_eq!(
            provider
                .probe("nfs-web-ui-definitely-not-a-command", &[])
                .await,
            None
        );
    }

    #[test]
    fn test_host_status_serialization() {
        let status = HostStatus {
            nfs_server: NfsServerStatus {
                status: "active".into(),
                enabled: true,
            },
            system: SystemStatus {
                uptime: "up 3 days".into(),
                memory: "1G/2G".into(),
                disk_usage: "40%".into(),
            },
        };

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["nfsServer"]["enabled"], true);
        assert_eq!(json["system"]["diskUsage"], "40%");
    }
}
