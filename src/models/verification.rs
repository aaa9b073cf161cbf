// src/models/verification.rs
//! Append-only audit entries for credential verification attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Verifier id recorded when no identified party requested the check.
pub const SYSTEM_VERIFIER: &str = "system";

/// Audit entry for one verification attempt.
///
/// `details` holds the failure reason, or a snapshot of the checked fields
/// (type, issuedAt, expiresAt) when the signature itself was valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationLog {
    pub id: String,
    pub credential_id: String,
    pub verifier_id: Option<String>,
    pub verification_result: bool,
    pub timestamp: DateTime<Utc>,
    pub details: Option<Value>,
}

/// Insert payload for a verification log entry.
#[derive(Debug, Clone)]
pub struct NewVerificationLog {
    pub credential_id: String,
    pub verifier_id: Option<String>,
    pub verification_result: bool,
    pub details: Option<Value>,
}
