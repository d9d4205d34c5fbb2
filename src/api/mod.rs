//! HTTP API for nfs-web-ui
//!
//! An axum router over the export and backup services. Every route except
//! `/api/login` requires a bearer token.

mod error;
mod extract;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use extract::AuthUser;
pub use routes::create_router;
pub use state::AppState;
