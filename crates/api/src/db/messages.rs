//! Chat message repository for database operations.

use sqlx::PgPool;

use bazaar_core::{MessageId, UserId};

use super::RepositoryError;
use crate::models::message::Message;

const MESSAGE_COLUMNS: &str = "id, sender_id, recipient_id, body, edited, created_at";

/// Repository for chat message database operations.
pub struct MessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MessageRepository<'a> {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a message by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let message = sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(message)
    }

    /// List the conversation between two users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn conversation(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE (sender_id = $1 AND recipient_id = $2) \
                OR (sender_id = $2 AND recipient_id = $1) \
             ORDER BY created_at"
        ))
        .bind(a)
        .bind(b)
        .fetch_all(self.pool)
        .await?;

        Ok(messages)
    }

    /// Insert a message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        sender_id: UserId,
        recipient_id: UserId,
        body: &str,
    ) -> Result<Message, RepositoryError> {
        let message = sqlx::query_as::<_, Message>(&format!(
            "INSERT INTO messages (sender_id, recipient_id, body) VALUES ($1, $2, $3) \
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(sender_id)
        .bind(recipient_id)
        .bind(body)
        .fetch_one(self.pool)
        .await?;

        Ok(message)
    }

    /// Edit a message body; only the sender's own messages match.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_body(
        &self,
        id: MessageId,
        sender_id: UserId,
        body: &str,
    ) -> Result<Option<Message>, RepositoryError> {
        let message = sqlx::query_as::<_, Message>(&format!(
            "UPDATE messages SET body = $3, edited = TRUE \
             WHERE id = $1 AND sender_id = $2 \
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(id)
        .bind(sender_id)
        .bind(body)
        .fetch_optional(self.pool)
        .await?;

        Ok(message)
    }

    /// Delete a message; only the sender's own messages match.
    ///
    /// # Returns
    ///
    /// `true` if the message was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: MessageId, sender_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1 AND sender_id = $2")
            .bind(id)
            .bind(sender_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
