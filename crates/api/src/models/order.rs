//! Order and order item models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use bazaar_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

/// A purchase snapshot.
///
/// Once the status reaches a terminal state (`DELIVERED` or `CANCELLED`),
/// no further status transition is permitted.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single line of an order, capturing unit price and quantity at the
/// time of purchase.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub unit_price: Decimal,
    pub quantity: i32,
}
