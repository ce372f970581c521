//! Authentication and authorization service.
//!
//! Registration and login use Argon2id password hashing; authenticated
//! requests carry a bearer token issued by
//! [`TokenService`](crate::services::token::TokenService). The admin gate
//! is a pure read-check: it validates the token, re-reads the user, and
//! rejects blocked users before looking at the role.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use bazaar_core::{Capability, Email, Role};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;
use crate::services::token::{TokenService, TokenTtl};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Username length bounds.
const USERNAME_LENGTH: std::ops::RangeInclusive<usize> = 3..=32;

/// Authentication service.
///
/// Handles registration, login, and the admin authorization gate.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    // =========================================================================
    // Registration & Login
    // =========================================================================

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail`/`InvalidUsername`/`WeakPassword` on
    /// validation failure, `AuthError::UserAlreadyExists` or
    /// `AuthError::UsernameTaken` on duplicates.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_username(username)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&email, username, &password_hash, role)
            .await
            .map_err(registration_conflict)?;

        Ok(user)
    }

    /// Login with email and password, issuing a token on success.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is
    /// wrong, `AuthError::UserBlocked` for blocked accounts.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ttl: TokenTtl,
    ) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if user.blocked {
            return Err(AuthError::UserBlocked);
        }

        let token = self.tokens.issue(&user, ttl)?;

        Ok((user, token))
    }

    /// Change a user's password after re-verifying the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the current password is
    /// wrong, `AuthError::WeakPassword` if the new one fails validation.
    pub async fn change_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let (_, password_hash) = self
            .users
            .get_with_password_hash(&user.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(current_password, &password_hash)?;

        validate_password(new_password)?;
        let new_hash = hash_password(new_password)?;
        self.users.set_password_hash(user.id, &new_hash).await?;

        Ok(())
    }

    /// Mark a user's email as verified.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the update fails.
    pub async fn verify_email(&self, user: &User) -> Result<(), AuthError> {
        self.users.verify_email(user.id).await?;
        Ok(())
    }

    // =========================================================================
    // Authorization Gate
    // =========================================================================

    /// Resolve the user behind a raw `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingToken` if the Bearer prefix is absent,
    /// a token error if validation fails, `AuthError::UserNotFound` or
    /// `AuthError::UserBlocked` based on current persisted state.
    pub async fn current_user(&self, authorization: Option<&str>) -> Result<User, AuthError> {
        let token = bearer_token(authorization)?;
        let claims = self.tokens.validate(token)?;

        let email = Email::parse(&claims.sub).map_err(|_| AuthError::UserNotFound)?;
        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.blocked {
            return Err(AuthError::UserBlocked);
        }

        Ok(user)
    }

    /// The admin gate: whether the caller behind `authorization` is an
    /// unblocked administrator. Pure read-check, no side effects.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::current_user`]; a valid non-admin caller yields
    /// `Ok(false)`, never an error.
    pub async fn authorize_admin(&self, authorization: Option<&str>) -> Result<bool, AuthError> {
        let user = self.current_user(authorization).await?;
        admin_decision(&user)
    }

    /// Like [`Self::authorize_admin`] but returns the user, failing with
    /// `AuthError::InsufficientRole` for non-admins.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::authorize_admin`].
    pub async fn require_admin(&self, authorization: Option<&str>) -> Result<User, AuthError> {
        let user = self.current_user(authorization).await?;
        if admin_decision(&user)? {
            Ok(user)
        } else {
            Err(AuthError::InsufficientRole)
        }
    }
}

/// Strip the `"Bearer "` prefix from an Authorization header value.
///
/// The header is the only accepted token transport.
fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    authorization
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// The role decision for an already-loaded user.
///
/// Blocked users never pass, regardless of role.
fn admin_decision(user: &User) -> Result<bool, AuthError> {
    if user.blocked {
        return Err(AuthError::UserBlocked);
    }
    Ok(user.role.can(Capability::ManageUsers))
}

/// Map a duplicate-user conflict to the auth error naming the field.
///
/// [`UserRepository::create`] reports unique violations as
/// `Conflict("Username already exists")` or `Conflict("Email already
/// exists")`; the message prefix is the discriminant.
fn registration_conflict(err: RepositoryError) -> AuthError {
    match err {
        RepositoryError::Conflict(msg) if msg.starts_with("Username") => AuthError::UsernameTaken,
        RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
        other => AuthError::Repository(other),
    }
}

/// Validate username meets requirements.
fn validate_username(username: &str) -> Result<(), AuthError> {
    if !USERNAME_LENGTH.contains(&username.len()) {
        return Err(AuthError::InvalidUsername(format!(
            "username must be between {} and {} characters",
            USERNAME_LENGTH.start(),
            USERNAME_LENGTH.end()
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AuthError::InvalidUsername(
            "username may only contain letters, digits, and underscores".to_owned(),
        ));
    }

    Ok(())
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::UserId;
    use chrono::Utc;

    fn user(role: Role, blocked: bool) -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("a@b.com").unwrap(),
            username: "bob".to_string(),
            role,
            blocked,
            email_verified: true,
            slug: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_bearer_token_strips_prefix() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_bearer_token_missing_header() {
        assert!(matches!(bearer_token(None), Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        assert!(matches!(
            bearer_token(Some("Basic dXNlcjpwYXNz")),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn test_bearer_token_empty_token() {
        assert!(matches!(
            bearer_token(Some("Bearer ")),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn test_admin_decision_for_roles() {
        assert!(admin_decision(&user(Role::Admin, false)).unwrap());
        assert!(!admin_decision(&user(Role::Seller, false)).unwrap());
        assert!(!admin_decision(&user(Role::Customer, false)).unwrap());
    }

    #[test]
    fn test_blocked_users_never_pass_the_gate() {
        for role in [Role::Admin, Role::Seller, Role::Customer] {
            assert!(matches!(
                admin_decision(&user(role, true)),
                Err(AuthError::UserBlocked)
            ));
        }
    }

    #[test]
    fn test_duplicate_username_conflict_is_distinguished() {
        assert!(matches!(
            registration_conflict(RepositoryError::Conflict(
                "Username already exists".to_owned()
            )),
            AuthError::UsernameTaken
        ));
    }

    #[test]
    fn test_duplicate_email_conflict_maps_to_existing_user() {
        assert!(matches!(
            registration_conflict(RepositoryError::Conflict("Email already exists".to_owned())),
            AuthError::UserAlreadyExists
        ));
    }

    #[test]
    fn test_non_conflict_errors_pass_through() {
        assert!(matches!(
            registration_conflict(RepositoryError::NotFound),
            AuthError::Repository(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("bob_42").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("bob smith").is_err());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
