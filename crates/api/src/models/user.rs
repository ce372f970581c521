//! User model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{Email, Role, Slug, UserId};

/// A registered user.
///
/// The password hash is deliberately not part of this struct; it is fetched
/// separately by the repository only where verification needs it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub username: String,
    pub role: Role,
    /// Blocked users fail every authorization check regardless of role.
    pub blocked: bool,
    pub email_verified: bool,
    /// URL-safe identifier for a seller's public profile.
    pub slug: Option<Slug>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
