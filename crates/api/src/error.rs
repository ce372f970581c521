//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! The taxonomy follows the domain: `NotFound`, `Unauthorized`, `Forbidden`,
//! `Validation` (aggregated field messages), `Conflict`, `InsufficientStock`,
//! and opaque `Database`/`Internal` failures. No error is retried; each is
//! isolated to the failing request.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;
use crate::services::token::TokenError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Token issuance or validation failed.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but not allowed (e.g., ownership violation).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Malformed payload, aggregated as field-level messages.
    #[error("Validation failed")]
    Validation(Vec<String>),

    /// State conflict (duplicate email/username, terminal order).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stock quantity would go negative.
    #[error("Insufficient stock")]
    InsufficientStock,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Build a `Validation` error from a single field message.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Database(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => err.status(),
            Self::Order(err) => err.status(),
            Self::Token(_) | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) | Self::InsufficientStock => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.status() == StatusCode::INTERNAL_SERVER_ERROR {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let body = match &self {
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                json!({"error": "Internal server error"})
            }
            Self::Database(RepositoryError::Conflict(message)) => json!({"error": message}),
            Self::Database(RepositoryError::NotFound) => json!({"error": "Not found"}),
            Self::Validation(messages) => json!({"errors": messages}),
            other => json!({"error": other.to_string()}),
        };

        (status, Json(body)).into_response()
    }
}

impl AuthError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials
            | Self::UserNotFound
            | Self::UserBlocked
            | Self::MissingToken
            | Self::Token(_) => StatusCode::UNAUTHORIZED,
            Self::InsufficientRole => StatusCode::FORBIDDEN,
            Self::UserAlreadyExists | Self::UsernameTaken => StatusCode::CONFLICT,
            Self::WeakPassword(_) | Self::InvalidEmail(_) | Self::InvalidUsername(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::PasswordHash | Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl OrderError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::OrderNotFound => StatusCode::NOT_FOUND,
            Self::TerminalOrder | Self::InvalidTransition { .. } | Self::InsufficientStock(_) => {
                StatusCode::CONFLICT
            }
            Self::UnknownStatus(_) | Self::EmptyCart => StatusCode::BAD_REQUEST,
            Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::Conflict("email already exists".to_string());
        assert_eq!(err.to_string(), "Conflict: email already exists");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::validation("bad field")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::InsufficientStock),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_conflicts_surface_as_conflict() {
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict(
                "Product already favorited".to_string()
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_token_errors_are_unauthorized() {
        assert_eq!(
            get_status(AppError::Token(TokenError::Expired)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Token(TokenError::Malformed)),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_order_error_statuses() {
        assert_eq!(
            get_status(AppError::Order(OrderError::OrderNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::TerminalOrder)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::UnknownStatus(
                "REFUNDED".to_string()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::EmptyCart)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserBlocked)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InsufficientRole)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
    }
}
