//! Credential service and access control guard.
//!
//! Passwords are hashed with argon2id. Session tokens are HS256 JWTs
//! carrying the user id, valid for a configurable number of days (120 by
//! default). The [`AuthUser`] extractor is the guard: it resolves the
//! bearer token and loads the account, so handlers receive a full `User`
//! or the request dies with 401 before the handler runs.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use hirelane_models::User;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// =============================================================================
// Passwords
// =============================================================================

/// Hash a password with argon2id and a fresh salt.
pub fn hash_password(plaintext: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(format!("Password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored digest.
pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// Tokens
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id.
    sub: String,
    /// Issued-at, seconds since epoch.
    iat: i64,
    /// Expiry, seconds since epoch.
    exp: i64,
}

/// Issue a signed session token for a user.
pub fn issue_token(user_id: &str, secret: &str, ttl_days: i64) -> ApiResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::days(ttl_days)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal(format!("Token signing failed: {}", e)))
}

/// Validate a token and return the user id it was issued for.
pub fn resolve_token(token: &str, secret: &str) -> ApiResult<String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims.sub)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => ApiError::unauthorized("Token expired"),
        _ => ApiError::unauthorized("Invalid token"),
    })
}

// =============================================================================
// Guard
// =============================================================================

/// The authenticated caller, resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Malformed Authorization header"))?;

        let user_id = resolve_token(token, &state.config.jwt_secret)?;

        let user = state
            .directory
            .get_user(&user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let digest = hash_password("hunter22").unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &digest));
        assert!(!verify_password("hunter23", &digest));
    }

    #[test]
    fn test_verify_rejects_garbage_digest() {
        assert!(!verify_password("hunter22", "not-a-hash"));
    }

    #[test]
    fn test_token_round_trip() {
        let token = issue_token("u1", "secret", 120).unwrap();
        assert_eq!(resolve_token(&token, "secret").unwrap(), "u1");
    }

    #[test]
    fn test_token_wrong_secret_is_invalid() {
        let token = issue_token("u1", "secret", 120).unwrap();
        let err = resolve_token(&token, "other-secret").unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(msg) if msg.contains("Invalid")));
    }

    #[test]
    fn test_expired_token_is_distinguished() {
        let token = issue_token("u1", "secret", -1).unwrap();
        let err = resolve_token(&token, "secret").unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(msg) if msg.contains("expired")));
    }
}
