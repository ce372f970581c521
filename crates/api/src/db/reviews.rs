//! Review repository for database operations.

use sqlx::PgPool;

use bazaar_core::{ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::review::Review;

const REVIEW_COLUMNS: &str = "id, user_id, product_id, rating, comment, parent_id, created_at";

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all reviews (and replies) for a product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE product_id = $1 ORDER BY created_at"
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }

    /// Get a review by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(review)
    }

    /// Insert a review or reply.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        product_id: ProductId,
        rating: i16,
        comment: &str,
        parent_id: Option<ReviewId>,
    ) -> Result<Review, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews (user_id, product_id, rating, comment, parent_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(user_id)
        .bind(product_id)
        .bind(rating)
        .bind(comment)
        .bind(parent_id)
        .fetch_one(self.pool)
        .await?;

        Ok(review)
    }

    /// Delete a review if owned by `user_id`. Replies cascade.
    ///
    /// # Returns
    ///
    /// `true` if the review was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ReviewId, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
