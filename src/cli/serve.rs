//! The `serve` command
//!
//! Runs the HTTP API until Ctrl-C or SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};

use crate::api::{create_router, AppState};
use crate::config::{ServerPaths, Settings};

/// Options for the HTTP server
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub listen: SocketAddr,
    pub static_dir: Option<PathBuf>,
}

/// Run the HTTP server
pub async fn serve(paths: &ServerPaths, settings: &Settings, options: ServeOptions) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(paths, settings)?);

    if let Some(dir) = &options.static_dir {
        if !dir.is_dir() {
            warn!(dir = %dir.display(), "static directory does not exist");
        }
    }

    let router = create_router(state, options.static_dir.clone());

    let listener = tokio::net::TcpListener::bind(options.listen)
        .await
        .with_context(|| format!("Failed to bind {}", options.listen))?;

    info!(listen = %options.listen, "NFS management server listening");
    info!(
        config = %paths.exports_file().display(),
        backups = %paths.backup_dir().display(),
        retention = settings.max_backups,
        "serving configuration"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
