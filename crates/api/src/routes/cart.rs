//! Cart route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::ProductId;

use crate::db::carts::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireUser;
use crate::models::cart::CartItem;
use crate::state::AppState;

/// Set-quantity request body.
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub product_id: ProductId,
    /// Zero or negative removes the item.
    pub quantity: i32,
}

/// `GET /api/cart`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<CartItem>>> {
    let items = CartRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(items))
}

/// `PUT /api/cart`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn set_quantity(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<SetQuantityRequest>,
) -> Result<Json<Option<CartItem>>> {
    let carts = CartRepository::new(state.pool());

    if req.quantity <= 0 {
        carts.remove(user.id, req.product_id).await?;
        return Ok(Json(None));
    }

    // Reject unknown products up front rather than at checkout.
    ProductRepository::new(state.pool())
        .get(req.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", req.product_id)))?;

    let item = carts
        .set_quantity(user.id, req.product_id, req.quantity)
        .await?;

    Ok(Json(Some(item)))
}

/// `DELETE /api/cart/{product_id}`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(product_id): Path<ProductId>,
) -> Result<StatusCode> {
    let removed = CartRepository::new(state.pool())
        .remove(user.id, product_id)
        .await?;
    if !removed {
        return Err(AppError::NotFound(format!(
            "product {product_id} not in cart"
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}
