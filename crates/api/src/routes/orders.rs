//! Order route handlers.
//!
//! All operations here are scoped to the caller's own orders; the admin
//! override lives under `/admin`.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use bazaar_core::OrderId;

use crate::error::{AppError, Result};
use crate::middleware::auth::RequireUser;
use crate::models::order::{Order, OrderItem};
use crate::services::orders::OrderService;
use crate::state::AppState;

/// Order detail response: the order plus its line items.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// `POST /api/orders`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn place(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<(StatusCode, Json<Order>)> {
    let order = OrderService::new(state.pool()).place_order(user.id).await?;

    tracing::info!(order_id = %order.id, total = %order.total, "order placed");

    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(orders))
}

/// `GET /api/orders/{id}`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    let service = OrderService::new(state.pool());
    let order = owned_order(&service, id, &user).await?;
    let items = service.items(id).await?;

    Ok(Json(OrderDetail { order, items }))
}

/// `POST /api/orders/{id}/confirm`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn confirm(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let service = OrderService::new(state.pool());
    owned_order(&service, id, &user).await?;
    let order = service.confirm(id).await?;

    tracing::info!(order_id = %id, "order confirmed");

    Ok(Json(order))
}

/// `POST /api/orders/{id}/cancel`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn cancel(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let service = OrderService::new(state.pool());
    owned_order(&service, id, &user).await?;
    let order = service.cancel(id).await?;

    tracing::info!(order_id = %id, "order cancelled");

    Ok(Json(order))
}

/// Load an order and verify the caller owns it.
async fn owned_order(
    service: &OrderService<'_>,
    id: OrderId,
    user: &crate::models::user::User,
) -> Result<Order> {
    let order = service.get(id).await?;
    if order.user_id != user.id {
        // Hide the existence of other users' orders.
        return Err(AppError::NotFound(format!("order {id}")));
    }
    Ok(order)
}
