//! Review model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{ProductId, ReviewId, UserId};

/// A product review or a reply to one.
///
/// Replies nest exactly one level: a review whose `parent_id` is set may
/// not itself receive replies.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub product_id: ProductId,
    /// 1 through 5.
    pub rating: i16,
    pub comment: String,
    pub parent_id: Option<ReviewId>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Whether this review is a reply to another review.
    #[must_use]
    pub const fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}
