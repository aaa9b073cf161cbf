// src/vc/envelope.rs
//! Credential envelope builder.
//!
//! Wraps arbitrary subject claims into a W3C Verifiable Credential
//! envelope. Building never fails: claims of any shape are embedded as-is.

use serde_json::Value;
use uuid::Uuid;

use crate::models::credential::{
    CredentialEnvelope, EnvelopeProof, ASSERTION_METHOD, JWT_PROOF_TYPE, VC_CONTEXT_V1,
    VERIFIABLE_CREDENTIAL_TAG,
};
use crate::utils::serialization::to_iso8601;

/// Builds a new envelope around `subject_claims`.
///
/// # Arguments
/// * `subject_claims` - Opaque claims about the holder
/// * `issuer` - URI of the issuing authority, e.g. `https://csvtu.ac.in/registrar`
/// * `type_tag` - Specific credential type tag, e.g. `AttendanceCredential`
///
/// # Returns
/// A fresh envelope with a new `urn:uuid:` id. Two builds from equal inputs
/// never produce equal envelopes.
pub fn build(subject_claims: Value, issuer: &str, type_tag: &str) -> CredentialEnvelope {
    let now = to_iso8601(chrono::Utc::now());

    CredentialEnvelope {
        context: vec![VC_CONTEXT_V1.to_string()],
        id: format!("urn:uuid:{}", Uuid::new_v4()),
        types: vec![VERIFIABLE_CREDENTIAL_TAG.to_string(), type_tag.to_string()],
        issuer: issuer.to_string(),
        issuance_date: now.clone(),
        credential_subject: subject_claims,
        proof: EnvelopeProof {
            proof_type: JWT_PROOF_TYPE.to_string(),
            created: now,
            proof_purpose: ASSERTION_METHOD.to_string(),
            verification_method: format!("{}/keys/1", issuer),
        },
    }
}
