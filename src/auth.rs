use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::AppConfig, error::ApiError};

/// Claims
///
/// Payload expected inside the bearer token. Tokens are issued elsewhere; this
/// service only verifies the signature and expiry and reads the subject.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the id of the authenticated user.
    pub sub: Uuid,
    /// Expiration time (seconds since the epoch).
    pub exp: usize,
    /// Issued at. Not every issuer sets it, and nothing here depends on it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
}

/// AuthUser
///
/// The resolved identity of an authenticated request. Every aggregate read and
/// mutation compares this id with the aggregate's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
}

/// AuthUser Extractor
///
/// Stateless per-request check:
/// 1. Read `Authorization: Bearer <token>`.
/// 2. Decode with the shared secret, enforcing `exp`.
/// 3. Return the `sub` claim as the user id.
///
/// Rejection: `ApiError::Unauthorized` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(*user);
        }

        let config = AppConfig::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                tracing::debug!("missing or malformed authorization header");
                ApiError::Unauthorized
            })?;

        let user = verify_token(token, &config.jwt_secret)?;
        parts.extensions.insert(user);
        Ok(user)
    }
}

/// Decodes `token` with `secret` and returns the identity it carries.
pub fn verify_token(token: &str, secret: &str) -> Result<AuthUser, ApiError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Ok(AuthUser {
            id: data.claims.sub,
        }),
        Err(e) => {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("rejected expired token"),
                ErrorKind::InvalidSignature => tracing::debug!("rejected token with bad signature"),
                other => tracing::debug!(reason = ?other, "rejected malformed token"),
            }
            Err(ApiError::Unauthorized)
        }
    }
}
