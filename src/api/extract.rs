//! Bearer token extractor

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use tracing::debug;

use super::error::ApiError;
use super::state::AppState;

/// The authenticated caller
///
/// Taking this as a handler argument guards the route: no token is a 401,
/// a token that fails verification is a 403.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(' ').nth(1))
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Access token required"))?;

        let claims = state.tokens.verify(token).map_err(|e| {
            debug!(error = %e, "rejected access token");
            ApiError::forbidden("Invalid token")
        })?;

        Ok(Self {
            username: claims.sub,
        })
    }
}
