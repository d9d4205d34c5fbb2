//! Server settings for nfs-web-ui
//!
//! Manages backup retention, the admin identity, token signing and the
//! hand-off delay granted to the external config manager after each write.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::paths::ServerPaths;
use crate::error::ExportsError;
use crate::storage::file_io::write_json_atomic;

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Number of snapshots kept after each new one
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,

    /// Pause after every committed write so the config manager can apply it
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Upper bound for each host status probe
    #[serde(default = "default_status_timeout_secs")]
    pub status_timeout_secs: u64,

    /// Admin login name
    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    /// Argon2 PHC string for the admin password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password_hash: Option<String>,

    /// Plaintext admin password, hashed once at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,

    /// HS256 signing secret; generated per process when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,

    /// Lifetime of issued tokens
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    /// Reject new exports whose directory is missing on this host
    #[serde(default)]
    pub require_existing_paths: bool,
}

fn default_max_backups() -> usize {
    10
}

fn default_settle_delay_ms() -> u64 {
    1000
}

fn default_status_timeout_secs() -> u64 {
    10
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_backups: default_max_backups(),
            settle_delay_ms: default_settle_delay_ms(),
            status_timeout_secs: default_status_timeout_secs(),
            admin_username: default_admin_username(),
            admin_password_hash: None,
            admin_password: None,
            jwt_secret: None,
            token_ttl_hours: default_token_ttl_hours(),
            require_existing_paths: false,
        }
    }
}

impl Settings {
    /// Load settings from disk and apply environment overrides
    ///
    /// A missing settings file yields the defaults.
    pub fn load(paths: &ServerPaths) -> Result<Self, ExportsError> {
        let mut settings = Self::load_file(paths)?;
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Load settings from disk only
    pub fn load_file(paths: &ServerPaths) -> Result<Self, ExportsError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| ExportsError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| ExportsError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Apply overrides from a key lookup (the process environment in production)
    ///
    /// Unparsable numeric values are ignored, as is a zero `MAX_BACKUPS`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(count) = lookup("MAX_BACKUPS")
            .and_then(|v| v.trim().parse().ok())
            .filter(|&count: &usize| count > 0)
        {
            self.max_backups = count;
        }
        if let Some(delay) = lookup("SETTLE_DELAY_MS").and_then(|v| v.trim().parse().ok()) {
            self.settle_delay_ms = delay;
        }
        if let Some(username) = lookup("ADMIN_USERNAME") {
            self.admin_username = username;
        }
        if let Some(hash) = lookup("ADMIN_PASSWORD_HASH") {
            self.admin_password_hash = Some(hash);
        }
        if let Some(password) = lookup("ADMIN_PASSWORD") {
            self.admin_password = Some(password);
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.jwt_secret = Some(secret);
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ServerPaths) -> Result<(), ExportsError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }

    /// Delay observed after each committed write
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Timeout for each status probe
    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.max_backups, 10);
        assert_eq!(settings.settle_delay(), Duration::from_secs(1));
        assert_eq!(settings.status_timeout(), Duration::from_secs(10));
        assert_eq!(settings.admin_username, "admin");
        assert!(!settings.require_existing_paths);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ServerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings::load_file(&paths).unwrap();
        assert_eq!(settings.max_backups, 10);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ServerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings {
            max_backups: 3,
            require_existing_paths: true,
            ..Settings::default()
        };
        settings.save(&paths).unwrap();

        let loaded = Settings::load_file(&paths).unwrap();
        assert_eq!(loaded.max_backups, 3);
        assert!(loaded.require_existing_paths);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ServerPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        std::fs::write(paths.settings_file(), r#"{"max_backups": 4}"#).unwrap();

        let loaded = Settings::load_file(&paths).unwrap();
        assert_eq!(loaded.max_backups, 4);
        assert_eq!(loaded.token_ttl_hours, 24);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ServerPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        std::fs::write(paths.settings_file(), "not json").unwrap();

        assert!(matches!(
            Settings::load_file(&paths),
            Err(ExportsError::Config(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("MAX_BACKUPS", "5"),
            ("SETTLE_DELAY_MS", "bogus"),
            ("ADMIN_USERNAME", "root"),
            ("JWT_SECRET", "s3cret"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.max_backups, 5);
        assert_eq!(settings.settle_delay_ms, 1000);
        assert_eq!(settings.admin_username, "root");
        assert_eq!(settings.jwt_secret.as_deref(), Some("s3cret"));
        assert!(settings.admin_password.is_none());
    }

    #[test]
    fn test_zero_max_backups_override_is_ignored() {
        let mut settings = Settings::default();
        settings.apply_overrides(|key| (key == "MAX_BACKUPS").then(|| "0".to_string()));

        assert_eq!(settings.max_backups, 10);
    }
}
