//! JWT issuance and validation.
//!
//! Tokens carry the subject (email), user id, username, issued-at, and
//! expiration claims, signed with HS256. There is no revocation list;
//! expiry is the only invalidation mechanism. The signing secret comes
//! from [`AppConfig`](crate::config::AppConfig) and is immutable for the
//! life of the process.

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::models::user::User;

const SECONDS_PER_HOUR: u64 = 3600;

/// Errors from token issuance and validation.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The expiration claim is in the past.
    #[error("token expired")]
    Expired,

    /// Bad signature, wrong algorithm, or unparseable structure.
    #[error("malformed token")]
    Malformed,

    /// The requested claim is not present in the token.
    #[error("claim not found: {0}")]
    ClaimNotFound(String),

    /// Claims could not be serialized during issuance.
    #[error("token signing failed")]
    Signing,
}

/// Claims embedded in every issued token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject: the user's email address.
    pub sub: String,
    /// User id.
    pub uid: i64,
    /// Username at issuance time.
    pub username: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiration, seconds since the epoch.
    pub exp: i64,
}

/// Token lifetime variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenTtl {
    /// One hour, for sensitive flows.
    Short,
    /// The configured default (24 hours unless overridden).
    #[default]
    Normal,
    /// Thirty days, for "remember me" sessions.
    Long,
}

impl TokenTtl {
    const fn as_secs(self, default_hours: u64) -> u64 {
        match self {
            Self::Short => SECONDS_PER_HOUR,
            Self::Normal => default_hours * SECONDS_PER_HOUR,
            Self::Long => 30 * 24 * SECONDS_PER_HOUR,
        }
    }
}

/// Stateless token service.
///
/// Constructed once from configuration and shared via
/// [`AppState`](crate::state::AppState).
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    default_ttl_hours: u64,
}

impl TokenService {
    /// Create a token service from the signing secret and default TTL.
    #[must_use]
    pub fn new(secret: &SecretString, default_ttl_hours: u64) -> Self {
        let bytes = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is the only invalidation mechanism, so no grace period.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
            default_ttl_hours,
        }
    }

    /// Issue a signed token for `user` with the given lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if the claims cannot be encoded.
    pub fn issue(&self, user: &User, ttl: TokenTtl) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        #[allow(clippy::cast_possible_wrap)] // TTLs are far below i64::MAX seconds
        let exp = now + ttl.as_secs(self.default_ttl_hours) as i64;
        self.issue_at(user, now, exp)
    }

    fn issue_at(&self, user: &User, iat: i64, exp: i64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user.email.as_str().to_owned(),
            uid: user.id.as_i64(),
            username: user.username.clone(),
            iat,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Signing)
    }

    /// Verify signature and expiry, returning the embedded claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Expired`] when now is at or past the expiration
    /// claim, [`TokenError::Malformed`] for anything else that fails
    /// verification.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        // jsonwebtoken only rejects exp strictly before now; the boundary
        // second itself must also fail.
        check_expiry(claims.exp, Utc::now().timestamp())?;

        Ok(claims)
    }

    /// Extract a single named claim as a JSON value.
    ///
    /// The token is fully validated first.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::ClaimNotFound`] if the claim is absent, or the
    /// validation error if the token itself is invalid.
    pub fn extract_claim(&self, token: &str, name: &str) -> Result<serde_json::Value, TokenError> {
        self.validate(token)?;

        let data = decode::<serde_json::Value>(token, &self.decoding, &self.validation)
            .map_err(|_| TokenError::Malformed)?;

        data.claims
            .get(name)
            .cloned()
            .ok_or_else(|| TokenError::ClaimNotFound(name.to_owned()))
    }
}

/// A token stops being valid the second `exp` names, not the one after.
const fn check_expiry(exp: i64, now: i64) -> Result<(), TokenError> {
    if exp <= now {
        return Err(TokenError::Expired);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::{Email, Role, UserId};

    fn secret() -> SecretString {
        SecretString::from("kQ9$vLp2#xW7mZ4!nB8&cF3@hJ6*dR1%")
    }

    fn test_user() -> User {
        User {
            id: UserId::new(17),
            email: Email::parse("bob@example.com").unwrap(),
            username: "bob".to_string(),
            role: Role::Customer,
            blocked: false,
            email_verified: true,
            slug: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_validate() {
        let service = TokenService::new(&secret(), 24);
        let token = service.issue(&test_user(), TokenTtl::Normal).unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.sub, "bob@example.com");
        assert_eq!(claims.uid, 17);
        assert_eq!(claims.username, "bob");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_ttl_variants_order() {
        let service = TokenService::new(&secret(), 24);
        let user = test_user();

        let short = service.validate(&service.issue(&user, TokenTtl::Short).unwrap());
        let normal = service.validate(&service.issue(&user, TokenTtl::Normal).unwrap());
        let long = service.validate(&service.issue(&user, TokenTtl::Long).unwrap());

        let (short, normal, long) = (short.unwrap(), normal.unwrap(), long.unwrap());
        assert!(short.exp < normal.exp);
        assert!(normal.exp < long.exp);
    }

    #[test]
    fn test_expired_token_fails() {
        let service = TokenService::new(&secret(), 24);
        let now = Utc::now().timestamp();
        let token = service.issue_at(&test_user(), now - 7200, now - 3600).unwrap();

        assert!(matches!(service.validate(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_expiry_is_inclusive_at_the_boundary() {
        assert!(check_expiry(100, 99).is_ok());
        assert!(matches!(check_expiry(100, 100), Err(TokenError::Expired)));
        assert!(matches!(check_expiry(100, 101), Err(TokenError::Expired)));
    }

    #[test]
    fn test_token_expiring_now_is_rejected() {
        let service = TokenService::new(&secret(), 24);
        let now = Utc::now().timestamp();
        let token = service.issue_at(&test_user(), now - 3600, now).unwrap();

        assert!(matches!(service.validate(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let service = TokenService::new(&secret(), 24);
        assert!(matches!(
            service.validate("not-a-token"),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn test_wrong_secret_is_malformed() {
        let issuer = TokenService::new(&secret(), 24);
        let verifier = TokenService::new(
            &SecretString::from("aT5^uY8(oP3)qS6_wD9+gH2-jK4=lZ7~"),
            24,
        );
        let token = issuer.issue(&test_user(), TokenTtl::Normal).unwrap();

        assert!(matches!(
            verifier.validate(&token),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn test_extract_claim() {
        let service = TokenService::new(&secret(), 24);
        let token = service.issue(&test_user(), TokenTtl::Normal).unwrap();

        let username = service.extract_claim(&token, "username").unwrap();
        assert_eq!(username, serde_json::json!("bob"));

        let uid = service.extract_claim(&token, "uid").unwrap();
        assert_eq!(uid, serde_json::json!(17));
    }

    #[test]
    fn test_extract_missing_claim() {
        let service = TokenService::new(&secret(), 24);
        let token = service.issue(&test_user(), TokenTtl::Normal).unwrap();

        assert!(matches!(
            service.extract_claim(&token, "favorite_color"),
            Err(TokenError::ClaimNotFound(name)) if name == "favorite_color"
        ));
    }
}
