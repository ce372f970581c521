//! Authentication extractors.
//!
//! Handlers declare their requirement in the signature: `RequireUser` for
//! any authenticated caller, `RequireSeller` for sellers (and admins),
//! `RequireAdmin` for administrators only. Every extractor re-reads the
//! user row, so a block applied after token issuance takes effect on the
//! next request.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn protected_handler(
//!     RequireUser(user): RequireUser,
//! ) -> impl IntoResponse {
//!     format!("Hello, {}!", user.username)
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use bazaar_core::Capability;

use crate::error::AppError;
use crate::models::user::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Extractor that requires any authenticated, unblocked user.
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).await?;
        Ok(Self(user))
    }
}

/// Extractor that requires a seller or admin.
pub struct RequireSeller(pub User);

impl FromRequestParts<AppState> for RequireSeller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).await?;
        if !user.role.can(Capability::ManageCatalog) {
            return Err(AppError::Forbidden(
                "Only sellers can access this resource".to_owned(),
            ));
        }
        Ok(Self(user))
    }
}

/// Extractor that requires an administrator.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthService::new(state.pool(), state.tokens());
        let user = auth.require_admin(authorization_header(parts)).await?;
        Ok(Self(user))
    }
}

async fn authenticate(parts: &Parts, state: &AppState) -> Result<User, AppError> {
    let auth = AuthService::new(state.pool(), state.tokens());
    Ok(auth.current_user(authorization_header(parts)).await?)
}

fn authorization_header(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}
