//! Administration route handlers.
//!
//! Every handler here takes `RequireAdmin`, which re-reads the caller's
//! row on each request; blocked admins lose access immediately.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bazaar_core::{OrderId, UserId};

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAdmin;
use crate::models::order::Order;
use crate::models::user::User;
use crate::services::auth::AuthService;
use crate::services::orders::OrderService;
use crate::state::AppState;

/// Force-status request body.
#[derive(Debug, Deserialize)]
pub struct ForceStatusRequest {
    /// Target status name, e.g. `"SHIPPED"`.
    pub status: String,
}

/// Authorization check response body.
#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub admin: bool,
}

/// `GET /admin/authorize`
///
/// Reports whether the caller is an unblocked administrator. Unlike the
/// other admin routes, a valid non-admin caller gets `{"admin": false}`
/// rather than a 403; auth failures still error as usual.
#[instrument(skip(state, headers))]
pub async fn authorize(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AuthorizeResponse>> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let admin = AuthService::new(state.pool(), state.tokens())
        .authorize_admin(authorization)
        .await?;

    Ok(Json(AuthorizeResponse { admin }))
}

/// `GET /admin/users`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users))
}

/// `POST /admin/users/{id}/block`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn block_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    if id == admin.id {
        return Err(AppError::validation("cannot block yourself"));
    }

    set_blocked(&state, id, true).await?;
    tracing::warn!(user_id = %id, "user blocked");

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /admin/users/{id}/unblock`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn unblock_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    set_blocked(&state, id, false).await?;
    tracing::info!(user_id = %id, "user unblocked");

    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /admin/orders/{id}/status`
///
/// Sets any known status directly, skipping intermediate states; the one
/// rule that still holds is that a terminal order cannot be resurrected.
#[instrument(skip(state, admin, req), fields(admin_id = %admin.id))]
pub async fn force_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(req): Json<ForceStatusRequest>,
) -> Result<Json<Order>> {
    let order = OrderService::new(state.pool())
        .update_status(id, &req.status)
        .await?;

    tracing::info!(order_id = %id, status = %order.status, "order status forced");

    Ok(Json(order))
}

async fn set_blocked(state: &AppState, id: UserId, blocked: bool) -> Result<()> {
    let repo = UserRepository::new(state.pool());
    repo.get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;
    repo.set_blocked(id, blocked).await?;
    Ok(())
}
