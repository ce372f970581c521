//! Favorites and subscription route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::{ProductId, Role, UserId};

use crate::db::products::ProductRepository;
use crate::db::social::SocialRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireUser;
use crate::models::social::{Favorite, Subscription};
use crate::state::AppState;

/// Add-favorite request body.
#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub product_id: ProductId,
}

/// Subscribe request body.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub seller_id: UserId,
}

/// `GET /api/favorites`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_favorites(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Favorite>>> {
    let favorites = SocialRepository::new(state.pool())
        .list_favorites(user.id)
        .await?;
    Ok(Json(favorites))
}

/// `POST /api/favorites`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add_favorite(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<Favorite>)> {
    ProductRepository::new(state.pool())
        .get(req.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", req.product_id)))?;

    let favorite = SocialRepository::new(state.pool())
        .add_favorite(user.id, req.product_id)
        .await?;

    Ok((StatusCode::CREATED, Json(favorite)))
}

/// `DELETE /api/favorites/{product_id}`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(product_id): Path<ProductId>,
) -> Result<StatusCode> {
    let removed = SocialRepository::new(state.pool())
        .remove_favorite(user.id, product_id)
        .await?;
    if !removed {
        return Err(AppError::NotFound(format!(
            "product {product_id} not in favorites"
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/subscriptions`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_subscriptions(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Subscription>>> {
    let subscriptions = SocialRepository::new(state.pool())
        .list_subscriptions(user.id)
        .await?;
    Ok(Json(subscriptions))
}

/// `POST /api/subscriptions`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn subscribe(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<Subscription>)> {
    if req.seller_id == user.id {
        return Err(AppError::validation("cannot subscribe to yourself"));
    }

    let seller = UserRepository::new(state.pool())
        .get_by_id(req.seller_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", req.seller_id)))?;
    if seller.role != Role::Seller {
        return Err(AppError::validation("can only subscribe to sellers"));
    }

    let subscription = SocialRepository::new(state.pool())
        .add_subscription(user.id, req.seller_id)
        .await?;

    Ok((StatusCode::CREATED, Json(subscription)))
}

/// `DELETE /api/subscriptions/{seller_id}`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn unsubscribe(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(seller_id): Path<UserId>,
) -> Result<StatusCode> {
    let removed = SocialRepository::new(state.pool())
        .remove_subscription(user.id, seller_id)
        .await?;
    if !removed {
        return Err(AppError::NotFound(format!(
            "no subscription to user {seller_id}"
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}
