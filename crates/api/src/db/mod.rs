//! Database operations for the marketplace `PostgreSQL`.
//!
//! ## Tables
//!
//! - `users` - Accounts, roles, blocked flags, seller slugs
//! - `user_passwords` - Argon2 password hashes, one row per user
//! - `products` / `product_characteristics` - Catalog
//! - `orders` / `order_items` - Purchase snapshots
//! - `cart_items` - Per-user carts
//! - `reviews` - Reviews with one level of replies
//! - `messages` - Direct chat
//! - `favorites` / `subscriptions` - Social associations
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and are embedded at compile
//! time via `sqlx::migrate!`; run them with [`run_migrations`].

pub mod carts;
pub mod messages;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod social;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply pending migrations from `crates/api/migrations/`.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Map a unique-constraint violation to [`RepositoryError::Conflict`]
/// with the given message, passing other errors through.
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}
