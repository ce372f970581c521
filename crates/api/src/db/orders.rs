//! Order repository for database operations.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use bazaar_core::{OrderId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::order::{Order, OrderItem};

const ORDER_COLUMNS: &str = "id, user_id, status, total, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, order_id, product_id, unit_price, quantity";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order =
            sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(order)
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// List the line items of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id"
        ))
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Insert a new order in state `NEW` inside an open transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert_order(
        conn: &mut PgConnection,
        user_id: UserId,
        total: Decimal,
    ) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (user_id, status, total) VALUES ($1, $2, $3) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(OrderStatus::New)
        .bind(total)
        .fetch_one(conn)
        .await?;

        Ok(order)
    }

    /// Insert an order line inside an open transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert_item(
        conn: &mut PgConnection,
        order_id: OrderId,
        product_id: ProductId,
        unit_price: Decimal,
        quantity: i32,
    ) -> Result<OrderItem, RepositoryError> {
        let item = sqlx::query_as::<_, OrderItem>(&format!(
            "INSERT INTO order_items (order_id, product_id, unit_price, quantity) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(order_id)
        .bind(product_id)
        .bind(unit_price)
        .bind(quantity)
        .fetch_one(conn)
        .await?;

        Ok(item)
    }

    /// Set the order status directly, refusing to leave a terminal state.
    ///
    /// The guard is part of the UPDATE itself, so a concurrent transition
    /// into DELIVERED or CANCELLED cannot be overwritten.
    ///
    /// # Returns
    ///
    /// The updated order, or `None` when the order is missing or already
    /// terminal.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn force_status(
        &self,
        id: OrderId,
        to: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $2, updated_at = now() \
             WHERE id = $1 AND status <> $3 AND status <> $4 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(to)
        .bind(OrderStatus::Delivered)
        .bind(OrderStatus::Cancelled)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Compare-and-swap the order status.
    ///
    /// The update only applies while the stored status still equals `from`,
    /// so two concurrent transitions cannot both succeed.
    ///
    /// # Returns
    ///
    /// `true` if the transition was applied.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn transition_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $3, updated_at = now() \
             WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
