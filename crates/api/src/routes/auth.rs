//! Registration, login, and profile route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bazaar_core::{Role, Slug};

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireSeller, RequireUser};
use crate::models::user::User;
use crate::services::auth::AuthService;
use crate::services::token::TokenTtl;
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    /// Defaults to CUSTOMER. ADMIN cannot be self-assigned.
    #[serde(default)]
    pub role: Option<Role>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Issue a 30-day token instead of the default lifetime.
    #[serde(default)]
    pub remember_me: bool,
}

/// Login response: the user plus a bearer token.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

/// `POST /api/auth/register`
#[instrument(skip(state, req), fields(username = %req.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    // Admin accounts are provisioned out of band, never via registration.
    let role = match req.role {
        Some(Role::Seller) => Role::Seller,
        _ => Role::Customer,
    };

    let auth = AuthService::new(state.pool(), state.tokens());
    let user = auth
        .register(&req.email, &req.username, &req.password, role)
        .await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /api/auth/login`
#[instrument(skip(state, req))]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let ttl = if req.remember_me {
        TokenTtl::Long
    } else {
        TokenTtl::Normal
    };

    let auth = AuthService::new(state.pool(), state.tokens());
    let (user, token) = auth.login(&req.email, &req.password, ttl).await?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(LoginResponse { user, token }))
}

/// `GET /api/auth/me`
pub async fn me(RequireUser(user): RequireUser) -> Json<User> {
    Json(user)
}

/// Change-password request body.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Set-slug request body.
#[derive(Debug, Deserialize)]
pub struct SetSlugRequest {
    pub slug: String,
}

/// `PUT /api/auth/password`
#[instrument(skip(state, req, user), fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode> {
    let auth = AuthService::new(state.pool(), state.tokens());
    auth.change_password(&user, &req.current_password, &req.new_password)
        .await?;

    tracing::info!(user_id = %user.id, "password changed");

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/auth/verify-email`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn verify_email(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<StatusCode> {
    let auth = AuthService::new(state.pool(), state.tokens());
    auth.verify_email(&user).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /api/auth/slug`
///
/// Accepts either an already-valid slug or free-form text (a shop name),
/// which gets slugified.
#[instrument(skip(state, req, seller), fields(user_id = %seller.id))]
pub async fn set_slug(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Json(req): Json<SetSlugRequest>,
) -> Result<StatusCode> {
    let slug = Slug::parse(&req.slug)
        .or_else(|_| Slug::from_title(&req.slug))
        .map_err(|e| AppError::validation(e.to_string()))?;

    UserRepository::new(state.pool())
        .set_slug(seller.id, &slug)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/sellers/{slug}`
#[instrument(skip(state))]
pub async fn seller_profile(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<User>> {
    let slug = Slug::parse(&slug).map_err(|e| AppError::validation(e.to_string()))?;

    let seller = UserRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("seller {slug}")))?;

    Ok(Json(seller))
}
