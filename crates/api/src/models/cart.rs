//! Cart item model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{CartItemId, ProductId, UserId};

/// A (user, product) pair with a quantity.
///
/// Unique per user/product; the row is deleted when quantity reaches zero.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}
