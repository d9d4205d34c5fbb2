//! API error responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::error::ExportsError;

/// Error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// API error response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<ExportsError> for ApiError {
    fn from(e: ExportsError) -> Self {
        match e {
            ExportsError::Validation(msg) => Self::bad_request(msg),
            // Duplicates are reported as bad requests, like invalid input
            e @ ExportsError::Duplicate { .. } => Self::bad_request(e.to_string()),
            e @ ExportsError::NotFound { .. } => Self::not_found(e.to_string()),
            ExportsError::Auth(msg) => Self::unauthorized(msg),
            e => {
                error!(error = %e, "request failed");
                Self::internal(e.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let cases = [
            (ExportsError::Validation("Invalid path: x".into()), StatusCode::BAD_REQUEST),
            (ExportsError::duplicate_export("/srv/a"), StatusCode::BAD_REQUEST),
            (ExportsError::export_not_found("/srv/a"), StatusCode::NOT_FOUND),
            (ExportsError::Auth("Invalid credentials".into()), StatusCode::UNAUTHORIZED),
            (ExportsError::Backup("disk full".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ExportsError::Storage("disk full".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status, status);
        }
    }

    #[test]
    fn test_validation_message_is_unwrapped() {
        let err = ApiError::from(ExportsError::Validation("Invalid IP address: 999.1.1.1".into()));
        assert_eq!(err.message, "Invalid IP address: 999.1.1.1");
    }
}
