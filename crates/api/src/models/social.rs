//! Favorites and seller subscriptions.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{FavoriteId, ProductId, SubscriptionId, UserId};

/// A product favorited by a user. Unique per (user, product).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Favorite {
    pub id: FavoriteId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
}

/// A user following a seller. Unique per (subscriber, seller).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub subscriber_id: UserId,
    pub seller_id: UserId,
    pub created_at: DateTime<Utc>,
}
