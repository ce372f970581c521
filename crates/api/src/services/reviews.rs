//! Review service.
//!
//! Ratings are integers from 1 to 5. Replies are limited to one level: a
//! review may answer a top-level review, never another reply.

use sqlx::PgPool;

use bazaar_core::{ProductId, ReviewId, UserId};

use crate::db::reviews::ReviewRepository;
use crate::error::{AppError, Result};
use crate::models::review::Review;

/// Valid rating bounds, inclusive.
const RATING_RANGE: std::ops::RangeInclusive<i16> = 1..=5;

/// Service for product reviews and replies.
pub struct ReviewService<'a> {
    reviews: ReviewRepository<'a>,
}

impl<'a> ReviewService<'a> {
    /// Create a new review service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            reviews: ReviewRepository::new(pool),
        }
    }

    /// List a product's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_for_product(&self, product_id: ProductId) -> Result<Vec<Review>> {
        Ok(self.reviews.list_for_product(product_id).await?)
    }

    /// Create a review or a reply.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an out-of-range rating or a reply
    /// to a reply, `AppError::NotFound` for a missing parent.
    pub async fn create(
        &self,
        user_id: UserId,
        product_id: ProductId,
        rating: i16,
        comment: &str,
        parent_id: Option<ReviewId>,
    ) -> Result<Review> {
        validate_rating(rating)?;

        if let Some(parent_id) = parent_id {
            let parent = self
                .reviews
                .get(parent_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("review {parent_id}")))?;

            if parent.is_reply() {
                return Err(AppError::validation("Cannot reply to a reply"));
            }
            if parent.product_id != product_id {
                return Err(AppError::validation(
                    "Parent review belongs to a different product",
                ));
            }
        }

        let review = self
            .reviews
            .create(user_id, product_id, rating, comment, parent_id)
            .await?;

        Ok(review)
    }

    /// Delete a review owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no such review exists for this user.
    pub async fn delete(&self, id: ReviewId, user_id: UserId) -> Result<()> {
        let deleted = self.reviews.delete(id, user_id).await?;
        if !deleted {
            return Err(AppError::NotFound(format!("review {id}")));
        }
        Ok(())
    }
}

/// Validate that a rating falls within the accepted range.
fn validate_rating(rating: i16) -> Result<()> {
    if !RATING_RANGE.contains(&rating) {
        return Err(AppError::validation(format!(
            "rating must be between {} and {}",
            RATING_RANGE.start(),
            RATING_RANGE.end()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds_are_inclusive() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
    }

    #[test]
    fn test_rating_out_of_range_is_rejected() {
        for bad in [0, 6, -1, 100] {
            assert!(matches!(
                validate_rating(bad),
                Err(AppError::Validation(_))
            ));
        }
    }
}
