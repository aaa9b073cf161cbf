// src/services/attendance.rs
//! Attendance check-ins.
//!
//! A check-in writes an attendance record and mints an attendance
//! credential for it. Both writes form one logical transaction: if the
//! credential cannot be issued or linked, the credential is revoked and the
//! record is removed again.

use log::{error, info, warn};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::WalletError;
use crate::models::attendance::{AttendanceRecord, NewAttendanceRecord};
use crate::models::credential::{Credential, CredentialType, CredentialUpdate};
use crate::services::credential_issuer::{CredentialIssuer, IssueRequest, SYSTEM_ISSUER_ID};
use crate::storage::Storage;
use crate::utils::serialization::to_iso8601;

/// One check-in request.
#[derive(Debug, Clone)]
pub struct CheckIn {
    pub student_id: String,
    pub session_id: String,
    pub subject: Option<String>,
    pub location: Option<String>,
}

/// The record and credential produced by a successful check-in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInReceipt {
    pub record: AttendanceRecord,
    pub credential: Credential,
}

#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn Storage>,
    issuer: CredentialIssuer,
    /// Issuer URI recorded in attendance envelopes
    attendance_issuer: String,
}

impl AttendanceService {
    pub fn new(
        store: Arc<dyn Storage>,
        issuer: CredentialIssuer,
        attendance_issuer: impl Into<String>,
    ) -> Self {
        Self {
            store,
            issuer,
            attendance_issuer: attendance_issuer.into(),
        }
    }

    /// Records a check-in and issues its attendance credential.
    ///
    /// The credential's subject claims carry the record's own timestamp.
    ///
    /// # Errors
    /// Fails if either write fails. A record whose credential could not be
    /// issued is rolled back before the error is returned.
    pub async fn check_in(&self, check_in: CheckIn) -> Result<CheckInReceipt, WalletError> {
        let record = self
            .store
            .create_attendance_record(NewAttendanceRecord {
                student_id: check_in.student_id.clone(),
                session_id: check_in.session_id.clone(),
                subject: check_in.subject.clone(),
                location: check_in.location.clone(),
            })
            .await?;

        let claims = json!({
            "studentId": record.student_id,
            "sessionId": record.session_id,
            "subject": record.subject,
            "location": record.location,
            "timestamp": to_iso8601(record.timestamp),
        });

        let issued = self
            .issuer
            .issue(IssueRequest {
                student_id: record.student_id.clone(),
                credential_type: CredentialType::Attendance,
                claims,
                issuer_uri: self.attendance_issuer.clone(),
                issuer_id: SYSTEM_ISSUER_ID.to_string(),
                expires_at: None,
            })
            .await;

        let credential = match issued {
            Ok(credential) => credential,
            Err(err) => {
                warn!("attendance credential for record {} failed: {}", record.id, err);
                self.roll_back(&record.id, None).await;
                return Err(err);
            }
        };

        let record = match self
            .store
            .link_attendance_credential(&record.id, &credential.id)
            .await
        {
            Ok(Some(record)) => record,
            Ok(None) => {
                self.roll_back(&record.id, Some(&credential.id)).await;
                return Err(WalletError::Storage(format!(
                    "attendance record {} vanished",
                    record.id
                )));
            }
            Err(err) => {
                warn!("linking attendance record {} failed: {}", record.id, err);
                self.roll_back(&record.id, Some(&credential.id)).await;
                return Err(err);
            }
        };

        info!(
            "{} checked in to session {} (credential {})",
            record.student_id, record.session_id, credential.id
        );
        Ok(CheckInReceipt { record, credential })
    }

    /// Undoes a partial check-in: revokes the credential, if one was
    /// issued, and removes the record. Failures here are logged only.
    async fn roll_back(&self, record_id: &str, credential_id: Option<&str>) {
        if let Some(credential_id) = credential_id {
            match self
                .store
                .update_credential(credential_id, CredentialUpdate::revoke())
                .await
            {
                Ok(Some(_)) => {}
                Ok(None) => error!("attendance credential {} missing during rollback", credential_id),
                Err(err) => error!("could not revoke attendance credential {}: {}", credential_id, err),
            }
        }
        if let Err(err) = self.store.remove_attendance_record(record_id).await {
            error!("could not roll back attendance record {}: {}", record_id, err);
        }
    }
}
