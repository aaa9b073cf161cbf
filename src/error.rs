// src/error.rs
//! Error types for the wallet core and its HTTP edge.
//!
//! [`WalletError`] is returned by the store and the services. [`ApiError`]
//! is what handlers return; it renders as a JSON `{"message": ...}` body with
//! the matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;

/// Failures raised inside the issuance, verification and storage pipeline.
#[derive(thiserror::Error, Debug)]
pub enum WalletError {
    #[error("signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("password hashing failed")]
    PasswordHash,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Errors surfaced to HTTP callers.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<WalletError> for ApiError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            WalletError::Conflict(message) => ApiError::Conflict(message),
            WalletError::InvalidCredentials => ApiError::Unauthorized("Invalid credentials".into()),
            other => {
                error!("request failed: {other}");
                ApiError::Internal("Server error".into())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "message": self.to_string() });
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_errors_map_to_status_codes() {
        let not_found: ApiError = WalletError::NotFound("Credential".into()).into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "Credential not found");

        let conflict: ApiError = WalletError::Conflict("Username already exists".into()).into();
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);

        let internal: ApiError = WalletError::Storage("lock poisoned".into()).into();
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.to_string(), "Server error");
    }
}
