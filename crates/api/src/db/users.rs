//! User repository for database operations.

use sqlx::PgPool;

use bazaar_core::{Email, Role, Slug, UserId};

use super::RepositoryError;
use crate::models::user::User;

const USER_COLUMNS: &str =
    "id, email, username, role, blocked, email_verified, slug, created_at, updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(user)
    }

    /// Get a seller by their public profile slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<User>, RepositoryError> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE slug = $1"))
                .bind(slug)
                .fetch_optional(self.pool)
                .await?;

        Ok(user)
    }

    /// Create a new user with an email, username, password hash, and role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or username already
    /// exists, `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, username, role) VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(username)
        .bind(role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                let message = match db_err.constraint() {
                    Some("users_username_key") => "Username already exists",
                    _ => "Email already exists",
                };
                return RepositoryError::Conflict(message.to_owned());
            }
            RepositoryError::Database(e)
        })?;

        sqlx::query("INSERT INTO user_passwords (user_id, password_hash) VALUES ($1, $2)")
            .bind(user.id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Get a user together with their password hash, by email.
    ///
    /// Returns `None` if the user doesn't exist or has no password set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHash>(
            "SELECT u.id, u.email, u.username, u.role, u.blocked, u.email_verified, u.slug, \
                    u.created_at, u.updated_at, p.password_hash \
             FROM users u \
             JOIN user_passwords p ON u.id = p.user_id \
             WHERE u.email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(UserWithHash::split))
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no password row.
    pub async fn set_password_hash(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE user_passwords SET password_hash = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Block or unblock a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_blocked(&self, user_id: UserId, blocked: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET blocked = $2, updated_at = now() WHERE id = $1")
            .bind(user_id)
            .bind(blocked)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Mark a user's email as verified.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn verify_email(&self, user_id: UserId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET email_verified = TRUE, updated_at = now() WHERE id = $1")
                .bind(user_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Assign a seller profile slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken,
    /// `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_slug(&self, user_id: UserId, slug: &Slug) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET slug = $2, updated_at = now() WHERE id = $1")
            .bind(user_id)
            .bind(slug)
            .execute(self.pool)
            .await
            .map_err(|e| super::conflict_on_unique(e, "Slug already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// List all users, newest first (admin view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }
}

/// Row shape for the user + password hash join.
#[derive(sqlx::FromRow)]
struct UserWithHash {
    id: UserId,
    email: Email,
    username: String,
    role: Role,
    blocked: bool,
    email_verified: bool,
    slug: Option<Slug>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    password_hash: String,
}

impl UserWithHash {
    fn split(self) -> (User, String) {
        (
            User {
                id: self.id,
                email: self.email,
                username: self.username,
                role: self.role,
                blocked: self.blocked,
                email_verified: self.email_verified,
                slug: self.slug,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            self.password_hash,
        )
    }
}
