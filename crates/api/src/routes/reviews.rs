//! Review route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::{ProductId, ReviewId};

use crate::error::Result;
use crate::middleware::auth::RequireUser;
use crate::models::review::Review;
use crate::services::reviews::ReviewService;
use crate::state::AppState;

/// Create-review request body.
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub product_id: ProductId,
    pub rating: i16,
    pub comment: String,
    /// Present when replying to a top-level review.
    pub parent_id: Option<ReviewId>,
}

/// `GET /api/products/{id}/reviews`
#[instrument(skip(state))]
pub async fn list_for_product(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<Review>>> {
    let reviews = ReviewService::new(state.pool())
        .list_for_product(product_id)
        .await?;
    Ok(Json(reviews))
}

/// `POST /api/reviews`
#[instrument(skip(state, req, user), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    let review = ReviewService::new(state.pool())
        .create(
            user.id,
            req.product_id,
            req.rating,
            &req.comment,
            req.parent_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// `DELETE /api/reviews/{id}`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<ReviewId>,
) -> Result<StatusCode> {
    ReviewService::new(state.pool()).delete(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
