//! Authentication error types.

use bazaar_core::EmailError;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::token::TokenError;

/// Errors from authentication and authorization operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or password. Deliberately indistinguishable from an
    /// unknown email to the caller.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No user exists for the token's subject email.
    #[error("User not found")]
    UserNotFound,

    /// The user has been blocked by an administrator.
    #[error("User is blocked")]
    UserBlocked,

    /// The Authorization header is absent or lacks the Bearer prefix.
    #[error("Missing bearer token")]
    MissingToken,

    /// The user is authenticated but lacks the required role.
    #[error("Insufficient role")]
    InsufficientRole,

    /// A user with this email is already registered.
    #[error("Email already exists")]
    UserAlreadyExists,

    /// A user with this username is already registered.
    #[error("Username already exists")]
    UsernameTaken,

    /// Password does not meet requirements.
    #[error("{0}")]
    WeakPassword(String),

    /// Email failed validation.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Username failed validation.
    #[error("{0}")]
    InvalidUsername(String),

    /// Token validation failed.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Password hashing failed.
    #[error("Password hashing failed")]
    PasswordHash,

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
