//! Shared application state

use std::sync::Arc;

use crate::auth::{Credentials, TokenIssuer};
use crate::config::{ServerPaths, Settings};
use crate::error::ExportsResult;
use crate::services::{Services, StatusProvider, SystemStatusProvider};

/// State shared by every request handler
pub struct AppState {
    pub services: Services,
    pub credentials: Credentials,
    pub tokens: TokenIssuer,
    pub status: Arc<dyn StatusProvider>,
}

impl AppState {
    /// Wire up services, credentials and the system status provider
    pub fn new(paths: &ServerPaths, settings: &Settings) -> ExportsResult<Self> {
        let status = Arc::new(SystemStatusProvider::new(settings.status_timeout()));
        Self::with_status_provider(paths, settings, status)
    }

    /// Same as `new` with a caller-supplied status provider
    pub fn with_status_provider(
        paths: &ServerPaths,
        settings: &Settings,
        status: Arc<dyn StatusProvider>,
    ) -> ExportsResult<Self> {
        Ok(Self {
            services: Services::open(paths, settings)?,
            credentials: Credentials::from_settings(settings)?,
            tokens: TokenIssuer::from_settings(settings),
            status,
        })
    }
}
