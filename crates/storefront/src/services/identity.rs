//! Request identity.
//!
//! Tokens are HS256 JWTs issued by the account service and signed with the
//! shared `STOREFRONT_JWT_SECRET`. The subject is the numeric user id. A
//! token only identifies a user if that user still exists.

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;

use threadline_core::UserId;

use crate::db::{RepositoryError, UserRepository};
use crate::models::CurrentUser;

/// Errors that can occur while resolving a request identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No token was presented.
    #[error("missing token")]
    MissingToken,

    /// Token failed signature, expiry or format checks.
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// Token is valid but names a user that does not exist.
    #[error("unknown user {0}")]
    UnknownUser(UserId),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// JWT claims carried by storefront tokens.
///
/// `sub` is the decimal user id as a string; registered claims are strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a decimal string.
    pub sub: String,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Issue time, seconds since the epoch.
    pub iat: i64,
}

/// Verifies bearer tokens and maps them to users.
#[derive(Clone)]
pub struct IdentityResolver {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Claims {
    /// The user named by `sub`.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidToken` if `sub` is not a numeric id.
    pub fn user_id(&self) -> Result<UserId, IdentityError> {
        self.sub
            .parse::<i32>()
            .map(UserId::new)
            .map_err(|_| {
                IdentityError::InvalidToken(jsonwebtoken::errors::ErrorKind::InvalidSubject.into())
            })
    }
}

impl fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}

impl IdentityResolver {
    /// Create a resolver for tokens signed with `secret`.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let key = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
        }
    }

    /// Sign a token for `user_id` that expires after `ttl`.
    ///
    /// Used by the CLI and tests; production tokens come from the account
    /// service.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidToken` if encoding fails.
    pub fn issue(&self, user_id: UserId, ttl: Duration) -> Result<String, IdentityError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify a token's signature and expiry.
    ///
    /// Accepts the raw token or an `Authorization` value with a `Bearer `
    /// prefix.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::MissingToken` for an empty value and
    /// `IdentityError::InvalidToken` if verification fails.
    pub fn decode(&self, token: &str) -> Result<Claims, IdentityError> {
        let token = strip_bearer(token);
        if token.is_empty() {
            return Err(IdentityError::MissingToken);
        }

        let claims = decode::<Claims>(token, &self.decoding, &self.validation)?.claims;
        claims.user_id()?;
        Ok(claims)
    }

    /// Verify a token and load the user it names.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::UnknownUser` if the user no longer exists,
    /// plus the errors of [`decode`](Self::decode).
    pub async fn resolve(&self, pool: &PgPool, token: &str) -> Result<CurrentUser, IdentityError> {
        let user_id = self.decode(token)?.user_id()?;

        let user = UserRepository::new(pool)
            .get_by_id(user_id)
            .await?
            .ok_or(IdentityError::UnknownUser(user_id))?;

        Ok(CurrentUser::from(user))
    }
}

fn strip_bearer(value: &str) -> &str {
    let value = value.trim_start();
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn resolver(secret: &str) -> IdentityResolver {
        IdentityResolver::new(&SecretString::from(secret.to_owned()))
    }

    #[test]
    fn test_issued_token_decodes() {
        let r = resolver("kR7#mQ2$vL9@nX4&pW6*jT8!hB3^cF5%");
        let token = r.issue(UserId::new(42), Duration::minutes(5)).unwrap();

        let claims = r.decode(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id().unwrap(), UserId::new(42));

        let claims = r.decode(&format!("Bearer {token}")).unwrap();
        assert_eq!(claims.user_id().unwrap(), UserId::new(42));
    }

    fn sign(claims: &serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(b"kR7#mQ2$vL9@nX4&pW6*jT8!hB3^cF5%"),
        )
        .unwrap()
    }

    #[test]
    fn test_non_numeric_subject_is_invalid() {
        let r = resolver("kR7#mQ2$vL9@nX4&pW6*jT8!hB3^cF5%");
        let exp = (Utc::now() + Duration::minutes(5)).timestamp();

        let token = sign(&serde_json::json!({ "sub": "alice", "exp": exp, "iat": 0 }));
        assert!(matches!(r.decode(&token), Err(IdentityError::InvalidToken(_))));

        let token = sign(&serde_json::json!({ "exp": exp, "iat": 0 }));
        assert!(matches!(r.decode(&token), Err(IdentityError::InvalidToken(_))));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = resolver("kR7#mQ2$vL9@nX4&pW6*jT8!hB3^cF5%")
            .issue(UserId::new(1), Duration::minutes(5))
            .unwrap();

        let err = resolver("zY1!aB2@cD3#eF4$gH5%iJ6^kL7&mN8*")
            .decode(&token)
            .unwrap_err();
        assert!(matches!(err, IdentityError::InvalidToken(_)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let r = resolver("kR7#mQ2$vL9@nX4&pW6*jT8!hB3^cF5%");
        let token = r.issue(UserId::new(1), Duration::hours(-1)).unwrap();

        assert!(matches!(
            r.decode(&token),
            Err(IdentityError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_empty_token_is_missing() {
        let r = resolver("kR7#mQ2$vL9@nX4&pW6*jT8!hB3^cF5%");
        assert!(matches!(r.decode(""), Err(IdentityError::MissingToken)));
        assert!(matches!(r.decode("Bearer "), Err(IdentityError::MissingToken)));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let r = resolver("kR7#mQ2$vL9@nX4&pW6*jT8!hB3^cF5%");
        assert!(matches!(
            r.decode("not.a.jwt"),
            Err(IdentityError::InvalidToken(_))
        ));
    }
}
