use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::{AppError, Result},
    models::{User, UserRole},
    repository::RepositoryState,
};

/// Claims
///
/// Payload of the bearer token. Only the subject is carried; the role is re-read from the
/// user record on every request so a role change applies to the very next call.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's id.
    pub sub: Uuid,
    /// Expiration Time (exp), seconds since the epoch.
    pub exp: usize,
    /// Issued At (iat), seconds since the epoch.
    pub iat: usize,
}

// --- Passwords ---

pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

// --- Tokens ---

/// issue_token
///
/// Signs a token for `user_id` that expires `config.jwt_ttl_secs` from now.
pub fn issue_token(user_id: Uuid, config: &AppConfig) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        exp: (now + config.jwt_ttl_secs) as usize,
        iat: now as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))
}

/// verify_token
///
/// Checks signature and expiry and returns the subject. Expiry is exact, with no leeway.
pub fn verify_token(token: &str, secret: &str) -> Result<Uuid> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims.sub)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::TokenInvalid,
    })
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// --- Extractor ---

/// AuthUser
///
/// The resolved identity of an authenticated request, together with the freshly loaded
/// user record. Lives for the duration of one request only.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
    pub user: User,
}

impl AuthUser {
    /// require_role
    ///
    /// Passes iff the caller holds exactly `expected`.
    pub fn require_role(&self, expected: UserRole) -> Result<()> {
        if self.role == expected {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Access denied. {} role required.",
                expected.label()
            )))
        }
    }
}

/// AuthUser Extractor Implementation
///
/// Resolution order, each step with its own rejection:
/// 1. Bearer header missing or not `Bearer <token>`: `MissingToken` (401).
/// 2. Signature or payload invalid: `TokenInvalid` (403); past expiry: `TokenExpired` (403).
/// 3. Subject no longer exists: `NotFound("User")` (404).
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let token = bearer_token(parts).ok_or(AppError::MissingToken)?;
        let user_id = verify_token(token, &config.jwt_secret)?;

        let user = repo
            .get_user(user_id)
            .await?
            .ok_or(AppError::NotFound("User"))?;

        Ok(AuthUser {
            id: user.id,
            role: user.role,
            user,
        })
    }
}

/// Optional identity for public endpoints that record who the caller is when they can.
/// Every failure, including a bad or expired token, resolves to a guest (`None`).
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Option<Self>> {
        if bearer_token(parts).is_none() {
            return Ok(None);
        }
        match <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state).await {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                tracing::debug!(error = %err, "ignoring unusable credentials on public route");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_carries_subject() {
        let config = AppConfig::default();
        let id = Uuid::new_v4();
        let token = issue_token(id, &config).unwrap();
        assert_eq!(verify_token(&token, &config.jwt_secret).unwrap(), id);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let config = AppConfig::default();
        let token = issue_token(Uuid::new_v4(), &config).unwrap();
        assert!(matches!(
            verify_token(&token, "another-secret"),
            Err(AppError::TokenInvalid)
        ));
        assert!(matches!(
            verify_token("not.a.jwt", &config.jwt_secret),
            Err(AppError::TokenInvalid)
        ));
    }

    #[test]
    fn elapsed_token_is_expired() {
        let config = AppConfig {
            jwt_ttl_secs: -60,
            ..AppConfig::default()
        };
        let token = issue_token(Uuid::new_v4(), &config).unwrap();
        assert!(matches!(
            verify_token(&token, &config.jwt_secret),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn password_hash_is_salted_and_verifies() {
        let first = hash_password("secret1", 4).unwrap();
        let second = hash_password("secret1", 4).unwrap();
        assert_ne!(first, second);
        assert_ne!(first, "secret1");
        assert!(verify_password("secret1", &first));
        assert!(!verify_password("secret2", &first));
        assert!(!verify_password("secret1", "not-a-hash"));
    }
}
