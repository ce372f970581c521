//! Chat message model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{MessageId, UserId};

/// A direct chat message between two users.
///
/// Only the sender may edit or delete a message.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub body: String,
    pub edited: bool,
    pub created_at: DateTime<Utc>,
}
