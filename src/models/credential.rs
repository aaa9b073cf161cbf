// src/models/credential.rs
//! Credential data model.
//!
//! Defines the stored credential record, the W3C Verifiable Credential
//! envelope carried inside it, and the closed set of credential categories
//! the wallet understands. Follows the structure of the
//! [W3C Verifiable Credentials Data Model](https://www.w3.org/TR/vc-data-model/).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// JSON-LD context every envelope declares.
pub const VC_CONTEXT_V1: &str = "https://www.w3.org/2018/credentials/v1";

/// Generic type tag present on every envelope.
pub const VERIFIABLE_CREDENTIAL_TAG: &str = "VerifiableCredential";

/// Proof type recorded in the envelope's descriptive proof block.
pub const JWT_PROOF_TYPE: &str = "JwtProof2020";

/// Proof purpose recorded in the envelope's descriptive proof block.
pub const ASSERTION_METHOD: &str = "assertionMethod";

/// Category of a credential.
///
/// Serialized as its wire string (`student-id`, `attendance`, `transcript`,
/// `certificate`). Unknown strings are kept verbatim in [`CredentialType::Other`]
/// so the set stays open on the wire while staying closed in code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CredentialType {
    StudentId,
    Attendance,
    Transcript,
    Certificate,
    /// Any category without dedicated handling.
    Other(String),
}

/// Presentation metadata for a credential category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayMeta {
    pub label: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

const STUDENT_ID_DISPLAY: DisplayMeta = DisplayMeta {
    label: "Student ID",
    icon: "fas fa-id-card",
    color: "from-primary to-primary-dark",
};
const ATTENDANCE_DISPLAY: DisplayMeta = DisplayMeta {
    label: "Attendance Record",
    icon: "fas fa-calendar-check",
    color: "from-secondary to-green-600",
};
const TRANSCRIPT_DISPLAY: DisplayMeta = DisplayMeta {
    label: "Academic Transcript",
    icon: "fas fa-graduation-cap",
    color: "from-purple-600 to-purple-700",
};
const CERTIFICATE_DISPLAY: DisplayMeta = DisplayMeta {
    label: "Certificate",
    icon: "fas fa-certificate",
    color: "from-accent to-orange-600",
};
const OTHER_DISPLAY: DisplayMeta = DisplayMeta {
    label: "Credential",
    icon: "fas fa-file",
    color: "from-neutral-600 to-neutral-700",
};

impl CredentialType {
    /// Wire string stored in the credential record.
    pub fn as_str(&self) -> &str {
        match self {
            CredentialType::StudentId => "student-id",
            CredentialType::Attendance => "attendance",
            CredentialType::Transcript => "transcript",
            CredentialType::Certificate => "certificate",
            CredentialType::Other(raw) => raw,
        }
    }

    /// Specific type tag placed next to `VerifiableCredential` in the envelope.
    pub fn type_tag(&self) -> &str {
        match self {
            CredentialType::StudentId => "StudentIdCredential",
            CredentialType::Attendance => "AttendanceCredential",
            CredentialType::Transcript => "TranscriptCredential",
            CredentialType::Certificate => "CertificateCredential",
            CredentialType::Other(raw) => raw,
        }
    }

    pub fn display(&self) -> DisplayMeta {
        match self {
            CredentialType::StudentId => STUDENT_ID_DISPLAY,
            CredentialType::Attendance => ATTENDANCE_DISPLAY,
            CredentialType::Transcript => TRANSCRIPT_DISPLAY,
            CredentialType::Certificate => CERTIFICATE_DISPLAY,
            CredentialType::Other(_) => OTHER_DISPLAY,
        }
    }
}

impl From<String> for CredentialType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            // `student_id` is the legacy spelling used by older seed data
            "student-id" | "student_id" => CredentialType::StudentId,
            "attendance" => CredentialType::Attendance,
            "transcript" => CredentialType::Transcript,
            "certificate" => CredentialType::Certificate,
            _ => CredentialType::Other(raw),
        }
    }
}

impl From<&str> for CredentialType {
    fn from(raw: &str) -> Self {
        CredentialType::from(raw.to_string())
    }
}

impl From<CredentialType> for String {
    fn from(kind: CredentialType) -> Self {
        match kind {
            CredentialType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive proof block embedded in an envelope.
///
/// This is metadata only. The cryptographic guarantee lives in the
/// credential's separate `signature` token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeProof {
    #[serde(rename = "type")]
    pub proof_type: String,
    /// ISO-8601 creation timestamp
    pub created: String,
    pub proof_purpose: String,
    /// Example: "https://csvtu.ac.in/registrar/keys/1"
    pub verification_method: String,
}

/// A W3C Verifiable Credential envelope.
///
/// Wraps opaque subject claims with context, identifiers, issuer and a
/// descriptive proof block. The serialized shape is fixed for interop:
///
/// ```json
/// {
///   "@context": ["https://www.w3.org/2018/credentials/v1"],
///   "id": "urn:uuid:...",
///   "type": ["VerifiableCredential", "AttendanceCredential"],
///   "issuer": "https://csvtu.ac.in/attendance",
///   "issuanceDate": "2024-01-01T00:00:00.000Z",
///   "credentialSubject": { ... },
///   "proof": { ... }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialEnvelope {
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// Globally unique URN, regenerated on every build
    pub id: String,

    #[serde(rename = "type")]
    pub types: Vec<String>,

    /// URI of the issuing authority
    pub issuer: String,

    pub issuance_date: String,

    /// Opaque claims about the holder
    pub credential_subject: Value,

    pub proof: EnvelopeProof,
}

/// A stored credential record.
///
/// # Fields
/// - `student_id`: subject reference, always the student's username
/// - `data`: the envelope that `signature` was produced over
/// - `signature`: opaque signed token binding `data` to the issuer secret
/// - `issuer_id`: id of the issuing admin, or `"system"` for automated issuance
///
/// Credentials are never deleted. Revocation flips `is_active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: String,
    pub student_id: String,
    #[serde(rename = "type")]
    pub credential_type: CredentialType,
    pub data: CredentialEnvelope,
    pub signature: String,
    pub issuer_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl Credential {
    /// Returns `true` when the credential is active and not past its expiry at `now`.
    pub fn is_current_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.map_or(true, |expires_at| expires_at > now)
    }
}

/// Insert payload for a credential. The store assigns id, `issued_at` and `is_active`.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub student_id: String,
    pub credential_type: CredentialType,
    pub data: CredentialEnvelope,
    pub signature: String,
    pub issuer_id: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Partial update merged into an existing credential.
///
/// `None` leaves a field untouched. For `expires_at`, `Some(None)` clears the expiry.
#[derive(Debug, Clone, Default)]
pub struct CredentialUpdate {
    pub is_active: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl CredentialUpdate {
    pub fn revoke() -> Self {
        CredentialUpdate {
            is_active: Some(false),
            ..Default::default()
        }
    }

    /// Merges the present fields into `credential`.
    pub fn apply_to(&self, credential: &mut Credential) {
        if let Some(is_active) = self.is_active {
            credential.is_active = is_active;
        }
        if let Some(expires_at) = self.expires_at {
            credential.expires_at = expires_at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_credential_type_wire_strings() {
        assert_eq!(CredentialType::from("student_id"), CredentialType::StudentId);
        assert_eq!(CredentialType::from("student-id"), CredentialType::StudentId);
        assert_eq!(
            CredentialType::from("library-card"),
            CredentialType::Other("library-card".into())
        );

        let json = serde_json::to_string(&CredentialType::StudentId).unwrap();
        assert_eq!(json, "\"student-id\"");
        let parsed: CredentialType = serde_json::from_str("\"certificate\"").unwrap();
        assert_eq!(parsed, CredentialType::Certificate);
    }

    #[test]
    fn test_display_lookup_falls_back_for_unknown_types() {
        assert_eq!(CredentialType::Attendance.display().label, "Attendance Record");
        assert_eq!(CredentialType::Other("x".into()).display().icon, "fas fa-file");
        assert_eq!(CredentialType::Other("x".into()).type_tag(), "x");
    }

    #[test]
    fn test_envelope_wire_shape() {
        let envelope = CredentialEnvelope {
            context: vec![VC_CONTEXT_V1.to_string()],
            id: "urn:uuid:1".into(),
            types: vec![VERIFIABLE_CREDENTIAL_TAG.into(), "TranscriptCredential".into()],
            issuer: "https://csvtu.ac.in/registrar".into(),
            issuance_date: "2024-01-01T00:00:00.000Z".into(),
            credential_subject: serde_json::json!({ "gpa": 9.1 }),
            proof: EnvelopeProof {
                proof_type: JWT_PROOF_TYPE.into(),
                created: "2024-01-01T00:00:00.000Z".into(),
                proof_purpose: ASSERTION_METHOD.into(),
                verification_method: "https://csvtu.ac.in/registrar/keys/1".into(),
            },
        };

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["@context"][0], VC_CONTEXT_V1);
        assert_eq!(value["type"][1], "TranscriptCredential");
        assert_eq!(value["issuanceDate"], "2024-01-01T00:00:00.000Z");
        assert_eq!(value["credentialSubject"]["gpa"], 9.1);
        assert_eq!(value["proof"]["type"], JWT_PROOF_TYPE);
        assert_eq!(value["proof"]["proofPurpose"], ASSERTION_METHOD);
    }

    #[test]
    fn test_update_merges_only_present_fields() {
        let now = Utc::now();
        let mut credential = Credential {
            id: "c1".into(),
            student_id: "2024CSE001".into(),
            credential_type: CredentialType::Transcript,
            data: CredentialEnvelope {
                context: vec![],
                id: "urn:uuid:2".into(),
                types: vec![],
                issuer: String::new(),
                issuance_date: String::new(),
                credential_subject: Value::Null,
                proof: EnvelopeProof {
                    proof_type: String::new(),
                    created: String::new(),
                    proof_purpose: String::new(),
                    verification_method: String::new(),
                },
            },
            signature: "sig".into(),
            issuer_id: "admin".into(),
            issued_at: now,
            expires_at: Some(now + Duration::days(1)),
            is_active: true,
        };

        CredentialUpdate::revoke().apply_to(&mut credential);
        assert!(!credential.is_active);
        assert!(credential.expires_at.is_some());
        assert!(!credential.is_current_at(now));
    }
}
