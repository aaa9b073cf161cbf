// src/services/api_server.rs
//! API Server for the student credential wallet
//!
//! This module provides the REST API in front of the issuance, verification
//! and attendance pipeline. It is built using Axum and includes endpoints for:
//! - Login, registration and profile lookup
//! - Credential listing, issuance, revocation and verification
//! - Attendance check-in with automatic attendance credentials
//! - The verification audit log
//!
//! Bodies are JSON with camelCase fields. Errors render as `{"message": ...}`.

use crate::config::Settings;
use crate::error::{ApiError, WalletError};
use crate::models::attendance::AttendanceRecord;
use crate::models::credential::{Credential, CredentialType};
use crate::models::user::PublicUser;
use crate::models::verification::VerificationLog;
use crate::services::accounts::{AccountService, Registration, Session};
use crate::services::attendance::{AttendanceService, CheckIn, CheckInReceipt};
use crate::services::auth::{AuthUser, SessionKeys};
use crate::services::credential_issuer::{CredentialIssuer, IssueRequest};
use crate::services::verifier::{VerificationReport, VerificationStatus, Verifier};
use crate::storage::Storage;
use crate::vc::signer::CredentialSigner;
use axum::{
    extract::{rejection::JsonRejection, FromRef, Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use log::info;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 64 * 1024;

// API request structures

/// Request payload for logging in
#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

/// Request payload for self-service registration
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    username: String,
    password: String,
    name: String,
    institution: Option<String>,
    course: Option<String>,
    year: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

/// Request payload for issuing a credential
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueCredentialRequest {
    student_id: String,
    #[serde(rename = "type")]
    credential_type: CredentialType,
    data: Value,
    expires_at: Option<DateTime<Utc>>,
}

/// Request payload for verifying a credential
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyCredentialRequest {
    credential_id: String,
}

/// Request payload for an attendance check-in
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckInRequest {
    session_id: String,
    subject: Option<String>,
    location: Option<String>,
}

/// Unwraps a JSON body, turning any extractor rejection into a validation error.
fn parse_body<T: DeserializeOwned>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            info!("rejected request body: {}", rejection.body_text());
            ApiError::Validation("Invalid request data".into())
        })
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::Validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

/// API server state containing all service dependencies
#[derive(Clone)]
pub struct ApiServer {
    /// Store shared by every service
    store: Arc<dyn Storage>,

    /// Service for issuing and revoking credentials
    credential_issuer: Arc<CredentialIssuer>,

    /// Service for verifying credentials
    verifier: Arc<Verifier>,

    /// Service for attendance check-ins
    attendance: Arc<AttendanceService>,

    /// Service for login and registration
    accounts: Arc<AccountService>,

    /// Session token keys used by the auth extractor
    sessions: SessionKeys,

    /// Issuer URI for manually issued credentials
    registrar_issuer: String,
}

impl FromRef<Arc<ApiServer>> for SessionKeys {
    fn from_ref(state: &Arc<ApiServer>) -> Self {
        state.sessions.clone()
    }
}

impl ApiServer {
    /// Wires every service around one store and one signing secret
    ///
    /// # Arguments
    /// * `settings` - Loaded runtime settings
    /// * `store` - The process-wide credential store
    ///
    /// # Errors
    /// Fails when the configured credential validity is out of range.
    pub fn new(settings: &Settings, store: Arc<dyn Storage>) -> Result<Self, WalletError> {
        let secret = settings.jwt_secret().as_bytes();
        let signer = Arc::new(CredentialSigner::new(
            secret,
            settings.credential_validity_years,
        )?);
        let sessions = SessionKeys::new(secret, settings.session_ttl_hours);

        let credential_issuer = CredentialIssuer::new(store.clone(), signer.clone());
        let attendance = AttendanceService::new(
            store.clone(),
            credential_issuer.clone(),
            settings.attendance_issuer.clone(),
        );

        Ok(ApiServer {
            verifier: Arc::new(Verifier::new(store.clone(), signer)),
            accounts: Arc::new(AccountService::new(store.clone(), sessions.clone())),
            credential_issuer: Arc::new(credential_issuer),
            attendance: Arc::new(attendance),
            store,
            sessions,
            registrar_issuer: settings.registrar_issuer.clone(),
        })
    }

    /// Builds the router with every API route
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(Self::health_handler))
            .route("/api/auth/login", post(Self::login_handler))
            .route("/api/auth/register", post(Self::register_handler))
            .route("/api/auth/me", get(Self::me_handler))
            .route("/api/credentials", get(Self::list_credentials_handler))
            .route("/api/credentials/issue", post(Self::issue_credential_handler))
            .route("/api/credentials/verify", post(Self::verify_credential_handler))
            .route("/api/credentials/:id/revoke", post(Self::revoke_credential_handler))
            .route(
                "/api/attendance",
                post(Self::check_in_handler).get(Self::list_attendance_handler),
            )
            .route("/api/admin/verifications", get(Self::verification_logs_handler))
            .layer(
                ServiceBuilder::new()
                    .layer(middleware::from_fn(log_requests))
                    .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
            )
            .with_state(Arc::new(self.clone())) // Share the entire ApiServer state
    }

    /// Starts the API server and begins listening for requests
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to (e.g., "127.0.0.1:3000")
    pub async fn run(&self, addr: SocketAddr) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("API server running at http://{}", listener.local_addr()?);
        axum::serve(listener, self.router()).await
    }

    async fn health_handler() -> impl IntoResponse {
        Json(json!({ "status": "ok" }))
    }

    // =====================
    // Account Handlers
    // =====================

    /// POST /api/auth/login
    ///
    /// # Responses
    /// - 200 OK: session token and profile
    /// - 400 Bad Request: malformed body
    /// - 401 Unauthorized: unknown user or wrong password
    async fn login_handler(
        State(state): State<Arc<ApiServer>>,
        payload: Result<Json<LoginRequest>, JsonRejection>,
    ) -> Result<Json<Session>, ApiError> {
        let request = parse_body(payload)?;
        require_non_empty(&request.username, "Username")?;
        require_non_empty(&request.password, "Password")?;

        let session = state
            .accounts
            .login(&request.username, &request.password)
            .await?;
        Ok(Json(session))
    }

    /// POST /api/auth/register
    ///
    /// # Responses
    /// - 201 Created: session token and profile
    /// - 400 Bad Request: malformed body
    /// - 409 Conflict: username taken
    async fn register_handler(
        State(state): State<Arc<ApiServer>>,
        payload: Result<Json<RegisterRequest>, JsonRejection>,
    ) -> Result<(StatusCode, Json<Session>), ApiError> {
        let request = parse_body(payload)?;
        require_non_empty(&request.username, "Username")?;
        require_non_empty(&request.password, "Password")?;
        require_non_empty(&request.name, "Name")?;

        let session = state
            .accounts
            .register(Registration {
                username: request.username,
                password: request.password,
                name: request.name,
                institution: request.institution,
                course: request.course,
                year: request.year,
                email: request.email,
                phone: request.phone,
            })
            .await?;
        Ok((StatusCode::CREATED, Json(session)))
    }

    /// GET /api/auth/me
    async fn me_handler(
        State(state): State<Arc<ApiServer>>,
        caller: AuthUser,
    ) -> Result<Json<PublicUser>, ApiError> {
        Ok(Json(state.accounts.me(&caller.id).await?))
    }

    // =====================
    // Credential Handlers
    // =====================

    /// GET /api/credentials
    ///
    /// Lists the caller's active credentials.
    async fn list_credentials_handler(
        State(state): State<Arc<ApiServer>>,
        caller: AuthUser,
    ) -> Result<Json<Vec<Credential>>, ApiError> {
        let credentials = state
            .store
            .list_credentials_by_student(&caller.username)
            .await?;
        Ok(Json(credentials))
    }

    /// Issues a new verifiable credential
    ///
    /// # Endpoint
    /// POST /api/credentials/issue (admin only)
    ///
    /// # Request Body
    /// `{ "studentId", "type", "data", "expiresAt"? }`
    ///
    /// # Responses
    /// - 201 Created: the stored credential
    /// - 400 Bad Request: malformed body
    /// - 401/403: missing identity or not an admin
    async fn issue_credential_handler(
        State(state): State<Arc<ApiServer>>,
        caller: AuthUser,
        payload: Result<Json<IssueCredentialRequest>, JsonRejection>,
    ) -> Result<(StatusCode, Json<Credential>), ApiError> {
        caller.require_admin()?;
        let request = parse_body(payload)?;
        require_non_empty(&request.student_id, "Student ID")?;

        let credential = state
            .credential_issuer
            .issue(IssueRequest {
                student_id: request.student_id,
                credential_type: request.credential_type,
                claims: request.data,
                issuer_uri: state.registrar_issuer.clone(),
                issuer_id: caller.id,
                expires_at: request.expires_at,
            })
            .await?;
        Ok((StatusCode::CREATED, Json(credential)))
    }

    /// POST /api/credentials/:id/revoke (admin only)
    async fn revoke_credential_handler(
        State(state): State<Arc<ApiServer>>,
        caller: AuthUser,
        Path(id): Path<String>,
    ) -> Result<Json<Credential>, ApiError> {
        caller.require_admin()?;
        Ok(Json(state.credential_issuer.revoke(&id).await?))
    }

    /// Verifies a credential's validity
    ///
    /// # Endpoint
    /// POST /api/credentials/verify (no authentication)
    ///
    /// # Responses
    /// - 200 OK: `{ valid, credential, message }`
    /// - 404 Not Found: `{ valid: false, message: "not found" }`
    async fn verify_credential_handler(
        State(state): State<Arc<ApiServer>>,
        payload: Result<Json<VerifyCredentialRequest>, JsonRejection>,
    ) -> Result<Response, ApiError> {
        let request = parse_body(payload)?;
        require_non_empty(&request.credential_id, "Credential ID")?;

        let report: VerificationReport = state.verifier.verify(&request.credential_id).await?;
        let status = match report.status {
            VerificationStatus::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::OK,
        };
        Ok((status, Json(report)).into_response())
    }

    // =====================
    // Attendance Handlers
    // =====================

    /// POST /api/attendance
    ///
    /// Checks the caller in and returns `{ record, credential }`.
    async fn check_in_handler(
        State(state): State<Arc<ApiServer>>,
        caller: AuthUser,
        payload: Result<Json<CheckInRequest>, JsonRejection>,
    ) -> Result<(StatusCode, Json<CheckInReceipt>), ApiError> {
        let request = parse_body(payload)?;
        require_non_empty(&request.session_id, "Session ID")?;

        let receipt = state
            .attendance
            .check_in(CheckIn {
                student_id: caller.username,
                session_id: request.session_id,
                subject: request.subject,
                location: request.location,
            })
            .await?;
        Ok((StatusCode::CREATED, Json(receipt)))
    }

    /// GET /api/attendance
    async fn list_attendance_handler(
        State(state): State<Arc<ApiServer>>,
        caller: AuthUser,
    ) -> Result<Json<Vec<AttendanceRecord>>, ApiError> {
        let records = state
            .store
            .list_attendance_by_student(&caller.username)
            .await?;
        Ok(Json(records))
    }

    // =====================
    // Audit
    // =====================

    /// GET /api/admin/verifications (admin only)
    async fn verification_logs_handler(
        State(state): State<Arc<ApiServer>>,
        caller: AuthUser,
    ) -> Result<Json<Vec<VerificationLog>>, ApiError> {
        caller.require_admin()?;
        Ok(Json(state.store.list_verification_logs().await?))
    }
}

/// Logs method, path, status and latency for every request.
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
