// src/services/auth.rs
//! Access-control gate.
//!
//! Session tokens are HS256 JWTs carrying `{id, username, isAdmin}`. The
//! [`AuthUser`] extractor resolves the caller from the `Authorization:
//! Bearer` header before a handler runs, so unauthenticated and
//! unauthorized requests never reach the core services.

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, WalletError};
use crate::models::user::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionClaims {
    id: String,
    username: String,
    is_admin: bool,
    iat: i64,
    exp: i64,
}

/// Keys for minting and checking session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
        SessionKeys {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Mints a session token for `user`.
    pub fn issue(&self, user: &User) -> Result<String, WalletError> {
        let now = Utc::now();
        let claims = SessionClaims {
            id: user.id.clone(),
            username: user.username.clone(),
            is_admin: user.is_admin,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Resolves a session token to the identity it was issued for.
    pub fn authenticate(&self, token: &str) -> Option<AuthUser> {
        let validation = Validation::new(Algorithm::HS256);
        match decode::<SessionClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Some(AuthUser {
                id: data.claims.id,
                username: data.claims.username,
                is_admin: data.claims.is_admin,
            }),
            Err(err) => {
                debug!("rejected session token: {}", err);
                None
            }
        }
    }
}

/// Authenticated caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub is_admin: bool,
}

impl AuthUser {
    /// Rejects callers without the admin flag.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin access required".into()))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    SessionKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Access token required".into()))?;

        SessionKeys::from_ref(state)
            .authenticate(token)
            .ok_or_else(|| ApiError::Forbidden("Invalid or expired token".into()))
    }
}
