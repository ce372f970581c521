//! Cart repository for database operations.

use sqlx::{PgConnection, PgPool};

use bazaar_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::CartItem;

const CART_COLUMNS: &str = "id, user_id, product_id, quantity, created_at";

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's cart items, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {CART_COLUMNS} FROM cart_items WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Set the quantity for a (user, product) pair, inserting the row if
    /// it doesn't exist yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let item = sqlx::query_as::<_, CartItem>(&format!(
            "INSERT INTO cart_items (user_id, product_id, quantity) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity \
             RETURNING {CART_COLUMNS}"
        ))
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;

        Ok(item)
    }

    /// Remove a product from the cart.
    ///
    /// # Returns
    ///
    /// `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List cart items inside an open transaction, locking the rows for the
    /// duration (used when placing an order).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_update(
        conn: &mut PgConnection,
        user_id: UserId,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {CART_COLUMNS} FROM cart_items WHERE user_id = $1 ORDER BY created_at \
             FOR UPDATE"
        ))
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(items)
    }

    /// Empty a user's cart inside an open transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(conn: &mut PgConnection, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(conn)
            .await?;

        Ok(())
    }
}
