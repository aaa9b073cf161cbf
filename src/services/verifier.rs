// src/services/verifier.rs
//! Credential verification service.
//!
//! Answers "is credential X valid" by checking, in order:
//! 1. the credential exists
//! 2. its signature token verifies under the shared secret
//! 3. it is active and not expired
//!
//! Signature integrity is checked before business validity, so a tampered
//! credential is always rejected as a signature failure. Every attempt past
//! the existence check leaves one entry in the verification log.

use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::WalletError;
use crate::models::credential::Credential;
use crate::models::verification::{NewVerificationLog, SYSTEM_VERIFIER};
use crate::storage::Storage;
use crate::vc::signer::CredentialSigner;

/// Outcome of one verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    Valid,
    NotFound,
    InvalidSignature,
    ExpiredOrInactive,
}

impl VerificationStatus {
    pub fn message(&self) -> &'static str {
        match self {
            VerificationStatus::Valid => "valid",
            VerificationStatus::NotFound => "not found",
            VerificationStatus::InvalidSignature => "invalid signature",
            VerificationStatus::ExpiredOrInactive => "expired or inactive",
        }
    }
}

/// Verification answer returned to callers.
///
/// `credential` is only present when the credential is valid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    pub valid: bool,
    pub credential: Option<Credential>,
    pub message: &'static str,
    #[serde(skip)]
    pub status: VerificationStatus,
}

impl VerificationReport {
    fn new(status: VerificationStatus, credential: Option<Credential>) -> Self {
        VerificationReport {
            valid: status == VerificationStatus::Valid,
            credential,
            message: status.message(),
            status,
        }
    }
}

/// Credential verifier backed by the store and the shared-secret signer.
#[derive(Clone)]
pub struct Verifier {
    store: Arc<dyn Storage>,
    signer: Arc<CredentialSigner>,
}

impl Verifier {
    pub fn new(store: Arc<dyn Storage>, signer: Arc<CredentialSigner>) -> Self {
        Self { store, signer }
    }

    /// Verifies a credential by id.
    ///
    /// # Returns
    /// - `NotFound` when no credential has this id (not logged)
    /// - `InvalidSignature` when the token fails integrity or expiry checks
    /// - `ExpiredOrInactive` when the credential is revoked or past `expires_at`
    /// - `Valid` with the full credential otherwise
    ///
    /// # Errors
    /// Only store failures are returned as errors; every verification
    /// failure is a normal [`VerificationReport`].
    pub async fn verify(&self, credential_id: &str) -> Result<VerificationReport, WalletError> {
        let Some(credential) = self.store.get_credential(credential_id).await? else {
            info!("verification of unknown credential {}", credential_id);
            return Ok(VerificationReport::new(VerificationStatus::NotFound, None));
        };

        if let Err(failure) = self.signer.verify(&credential.signature) {
            warn!("credential {} failed signature check: {}", credential_id, failure);
            self.store
                .create_verification_log(NewVerificationLog {
                    credential_id: credential_id.to_string(),
                    verifier_id: Some(SYSTEM_VERIFIER.to_string()),
                    verification_result: false,
                    details: Some(json!({ "reason": "Invalid signature" })),
                })
                .await?;
            return Ok(VerificationReport::new(
                VerificationStatus::InvalidSignature,
                None,
            ));
        }

        let is_valid = credential.is_current_at(Utc::now());
        self.store
            .create_verification_log(NewVerificationLog {
                credential_id: credential_id.to_string(),
                verifier_id: Some(SYSTEM_VERIFIER.to_string()),
                verification_result: is_valid,
                details: Some(json!({
                    "credentialType": credential.credential_type,
                    "issuedAt": credential.issued_at,
                    "expiresAt": credential.expires_at,
                })),
            })
            .await?;

        if is_valid {
            info!("credential {} verified", credential_id);
            Ok(VerificationReport::new(
                VerificationStatus::Valid,
                Some(credential),
            ))
        } else {
            info!("credential {} is expired or inactive", credential_id);
            Ok(VerificationReport::new(
                VerificationStatus::ExpiredOrInactive,
                None,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::credential::{CredentialType, CredentialUpdate};
    use crate::services::credential_issuer::{CredentialIssuer, IssueRequest};
    use crate::storage::memory::MemStorage;
    use crate::storage::seed::seed_demo_data;
    use chrono::Duration;
    use serde_json::json;

    struct Fixture {
        store: Arc<MemStorage>,
        issuer: CredentialIssuer,
        verifier: Verifier,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemStorage::new());
        let signer = Arc::new(CredentialSigner::new(b"verifier-test", 10).unwrap());
        Fixture {
            issuer: CredentialIssuer::new(store.clone(), signer.clone()),
            verifier: Verifier::new(store.clone(), signer),
            store,
        }
    }

    fn certificate(expires_in: Option<Duration>) -> IssueRequest {
        IssueRequest {
            student_id: "2024CSE001".into(),
            credential_type: CredentialType::Certificate,
            claims: json!({ "title": "Hackathon Winner" }),
            issuer_uri: "https://csvtu.ac.in/registrar".into(),
            issuer_id: "admin-id".into(),
            expires_at: expires_in.map(|offset| Utc::now() + offset),
        }
    }

    /// Flips one character in the middle of the token's signature segment.
    fn tamper(token: &str) -> String {
        let signature_start = token.rfind('.').unwrap() + 1;
        let index = signature_start + (token.len() - signature_start) / 2;
        let mut bytes = token.as_bytes().to_vec();
        bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
        String::from_utf8(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_valid_credential() {
        let f = fixture();
        let credential = f.issuer.issue(certificate(Some(Duration::days(30)))).await.unwrap();

        let report = f.verifier.verify(&credential.id).await.unwrap();
        assert!(report.valid);
        assert_eq!(report.message, "valid");
        assert_eq!(report.credential, Some(credential.clone()));

        let logs = f.store.list_verification_logs().await.unwrap();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].verification_result);
        assert_eq!(logs[0].verifier_id.as_deref(), Some("system"));
        let details = logs[0].details.as_ref().unwrap();
        assert_eq!(details["credentialType"], "certificate");
    }

    #[tokio::test]
    async fn test_valid_without_expiry() {
        let f = fixture();
        let credential = f.issuer.issue(certificate(None)).await.unwrap();
        assert!(f.verifier.verify(&credential.id).await.unwrap().valid);
    }

    #[tokio::test]
    async fn test_not_found_is_not_logged() {
        let f = fixture();
        let report = f.verifier.verify("missing").await.unwrap();
        assert!(!report.valid);
        assert_eq!(report.status, VerificationStatus::NotFound);
        assert_eq!(report.message, "not found");
        assert!(f.store.list_verification_logs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tampered_signature_is_rejected_and_logged_once() {
        let f = fixture();
        let credential = f.issuer.issue(certificate(None)).await.unwrap();

        // Store a credential whose signature has one byte changed.
        let forged = f
            .store
            .create_credential(crate::models::credential::NewCredential {
                student_id: credential.student_id.clone(),
                credential_type: credential.credential_type.clone(),
                data: credential.data.clone(),
                signature: tamper(&credential.signature),
                issuer_id: credential.issuer_id.clone(),
                expires_at: None,
            })
            .await
            .unwrap();

        let report = f.verifier.verify(&forged.id).await.unwrap();
        assert!(!report.valid);
        assert_eq!(report.message, "invalid signature");
        assert!(report.credential.is_none());

        let logs = f.store.list_verification_logs().await.unwrap();
        assert_eq!(logs.len(), 1);
        assert!(!logs[0].verification_result);
        assert_eq!(logs[0].credential_id, forged.id);
        assert_eq!(logs[0].details, Some(json!({ "reason": "Invalid signature" })));
    }

    #[tokio::test]
    async fn test_inactive_credential() {
        let f = fixture();
        let credential = f.issuer.issue(certificate(None)).await.unwrap();
        f.store
            .update_credential(&credential.id, CredentialUpdate::revoke())
            .await
            .unwrap();

        let report = f.verifier.verify(&credential.id).await.unwrap();
        assert!(!report.valid);
        assert_eq!(report.message, "expired or inactive");

        let logs = f.store.list_verification_logs().await.unwrap();
        assert_eq!(logs.len(), 1);
        assert!(!logs[0].verification_result);
        assert!(logs[0].details.as_ref().unwrap().get("issuedAt").is_some());
    }

    #[tokio::test]
    async fn test_expired_credential() {
        let f = fixture();
        let credential = f
            .issuer
            .issue(certificate(Some(Duration::days(-1))))
            .await
            .unwrap();

        let report = f.verifier.verify(&credential.id).await.unwrap();
        assert!(!report.valid);
        assert_eq!(report.status, VerificationStatus::ExpiredOrInactive);
    }

    #[tokio::test]
    async fn test_revoked_expired_and_tampered_reports_signature_first() {
        let f = fixture();
        let credential = f.issuer.issue(certificate(None)).await.unwrap();
        let forged = f
            .store
            .create_credential(crate::models::credential::NewCredential {
                student_id: credential.student_id.clone(),
                credential_type: credential.credential_type.clone(),
                data: credential.data.clone(),
                signature: tamper(&credential.signature),
                issuer_id: credential.issuer_id.clone(),
                expires_at: Some(Utc::now() - Duration::days(1)),
            })
            .await
            .unwrap();
        f.store
            .update_credential(&forged.id, CredentialUpdate::revoke())
            .await
            .unwrap();

        let report = f.verifier.verify(&forged.id).await.unwrap();
        assert_eq!(report.status, VerificationStatus::InvalidSignature);
    }

    #[tokio::test]
    async fn test_seeded_demo_credentials_fail_signature() {
        let f = fixture();
        let demo = seed_demo_data(f.store.as_ref(), "https://csvtu.ac.in/registrar")
            .await
            .unwrap();

        for credential in demo.credentials {
            let report = f.verifier.verify(&credential.id).await.unwrap();
            assert_eq!(report.status, VerificationStatus::InvalidSignature);
        }
        assert_eq!(f.store.list_verification_logs().await.unwrap().len(), 2);
    }
}
