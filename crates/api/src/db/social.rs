//! Favorites and subscription repositories.

use sqlx::PgPool;

use bazaar_core::{ProductId, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::social::{Favorite, Subscription};

/// Repository for favorites and seller subscriptions.
pub struct SocialRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SocialRepository<'a> {
    /// Create a new social repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's favorites, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_favorites(&self, user_id: UserId) -> Result<Vec<Favorite>, RepositoryError> {
        let favorites = sqlx::query_as::<_, Favorite>(
            "SELECT id, user_id, product_id, created_at FROM favorites \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(favorites)
    }

    /// Add a product to a user's favorites.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if already favorited.
    pub async fn add_favorite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Favorite, RepositoryError> {
        let favorite = sqlx::query_as::<_, Favorite>(
            "INSERT INTO favorites (user_id, product_id) VALUES ($1, $2) \
             RETURNING id, user_id, product_id, created_at",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Product already favorited"))?;

        Ok(favorite)
    }

    /// Remove a product from a user's favorites.
    ///
    /// # Returns
    ///
    /// `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_favorite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List the sellers a user follows, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_subscriptions(
        &self,
        subscriber_id: UserId,
    ) -> Result<Vec<Subscription>, RepositoryError> {
        let subscriptions = sqlx::query_as::<_, Subscription>(
            "SELECT id, subscriber_id, seller_id, created_at FROM subscriptions \
             WHERE subscriber_id = $1 ORDER BY created_at DESC",
        )
        .bind(subscriber_id)
        .fetch_all(self.pool)
        .await?;

        Ok(subscriptions)
    }

    /// Subscribe a user to a seller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if already subscribed.
    pub async fn add_subscription(
        &self,
        subscriber_id: UserId,
        seller_id: UserId,
    ) -> Result<Subscription, RepositoryError> {
        let subscription = sqlx::query_as::<_, Subscription>(
            "INSERT INTO subscriptions (subscriber_id, seller_id) VALUES ($1, $2) \
             RETURNING id, subscriber_id, seller_id, created_at",
        )
        .bind(subscriber_id)
        .bind(seller_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Already subscribed"))?;

        Ok(subscription)
    }

    /// Unsubscribe a user from a seller.
    ///
    /// # Returns
    ///
    /// `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_subscription(
        &self,
        subscriber_id: UserId,
        seller_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = $1 AND seller_id = $2")
                .bind(subscriber_id)
                .bind(seller_id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
