// src/services/credential_issuer.rs
//! Credential Issuer Service
//!
//! Orchestrates the envelope builder, the signer and the store to mint new
//! credentials, and revokes existing ones.
//!
//! Issuance is a three-step pipeline:
//! 1. Build the W3C envelope around the subject claims
//! 2. Sign the envelope into a detached JWT
//! 3. Persist envelope and signature together as one credential
//!
//! Steps 1 and 2 run before any write, so a failure leaves nothing behind.

use chrono::{DateTime, Utc};
use log::info;
use serde_json::Value;
use std::sync::Arc;

use crate::error::WalletError;
use crate::models::credential::{Credential, CredentialType, CredentialUpdate, NewCredential};
use crate::storage::Storage;
use crate::vc::envelope;
use crate::vc::signer::CredentialSigner;

/// Issuer id recorded on credentials minted without a human issuer.
pub const SYSTEM_ISSUER_ID: &str = "system";

/// Parameters for a single issuance.
#[derive(Debug, Clone)]
pub struct IssueRequest {
    /// Subject reference (the student's username)
    pub student_id: String,
    pub credential_type: CredentialType,
    /// Opaque claims embedded as `credentialSubject`
    pub claims: Value,
    /// URI of the issuing authority
    pub issuer_uri: String,
    /// Id of the issuing admin, or [`SYSTEM_ISSUER_ID`]
    pub issuer_id: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Service for issuing and revoking credentials.
#[derive(Clone)]
pub struct CredentialIssuer {
    store: Arc<dyn Storage>,
    signer: Arc<CredentialSigner>,
}

impl CredentialIssuer {
    /// Creates a new CredentialIssuer instance
    ///
    /// # Arguments
    /// * `store` - Store that will own the issued credentials
    /// * `signer` - Signer holding the process-wide secret
    pub fn new(store: Arc<dyn Storage>, signer: Arc<CredentialSigner>) -> Self {
        Self { store, signer }
    }

    /// Issues a new signed credential.
    ///
    /// # Returns
    /// The stored credential. Its `signature` verifies against its `data`
    /// at the moment of creation.
    ///
    /// # Errors
    /// Returns an error if signing or persistence fails. No credential is
    /// stored in that case.
    pub async fn issue(&self, request: IssueRequest) -> Result<Credential, WalletError> {
        let data = envelope::build(
            request.claims,
            &request.issuer_uri,
            request.credential_type.type_tag(),
        );
        let signature = self.signer.sign(&data)?;

        let credential = self
            .store
            .create_credential(NewCredential {
                student_id: request.student_id,
                credential_type: request.credential_type,
                data,
                signature,
                issuer_id: request.issuer_id,
                expires_at: request.expires_at,
            })
            .await?;

        info!(
            "issued {} credential {} to {} (issuer {})",
            credential.credential_type, credential.id, credential.student_id, credential.issuer_id
        );
        Ok(credential)
    }

    /// Revokes a credential by flipping `is_active`. The record stays stored.
    ///
    /// # Errors
    /// Returns [`WalletError::NotFound`] if no credential has this id.
    pub async fn revoke(&self, credential_id: &str) -> Result<Credential, WalletError> {
        let credential = self
            .store
            .update_credential(credential_id, CredentialUpdate::revoke())
            .await?
            .ok_or_else(|| WalletError::NotFound("Credential".into()))?;

        info!("revoked credential {}", credential.id);
        Ok(credential)
    }
}
