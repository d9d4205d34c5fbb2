use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use super::handlers;
use super::state::AppState;

/// Build the application router
///
/// When `static_dir` is set, unmatched requests are served from it.
pub fn create_router(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    let api_routes = Router::new()
        .route("/api/login", post(handlers::login))
        // Exports
        .route(
            "/api/exports",
            get(handlers::list_exports).post(handlers::create_export),
        )
        .route("/api/exports/clients", delete(handlers::remove_client))
        .route(
            "/api/exports/{*path}",
            put(handlers::update_export)
                .delete(handlers::delete_export)
                .post(handlers::add_client),
        )
        // Backups
        .route("/api/backups", get(handlers::list_backups))
        .route(
            "/api/backups/restore/{filename}",
            post(handlers::restore_backup),
        )
        .route("/api/backups/{filename}", delete(handlers::delete_backup))
        // System
        .route("/api/status", get(handlers::get_status));

    let router = match static_dir {
        Some(dir) => api_routes.fallback_service(ServeDir::new(dir)),
        None => api_routes,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
