// src/storage/memory.rs
//! Volatile in-memory implementation of [`Storage`].
//!
//! Each entity type lives in its own `RwLock<HashMap>` keyed by a UUID v4
//! string. Inserts and credential updates happen under the write lock, so
//! a concurrent reader sees either the old or the new entity, never a
//! partial one. Nothing survives a restart.

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::Storage;
use crate::error::WalletError;
use crate::models::attendance::{AttendanceRecord, NewAttendanceRecord};
use crate::models::credential::{Credential, CredentialUpdate, NewCredential};
use crate::models::user::{NewUser, User};
use crate::models::verification::{NewVerificationLog, VerificationLog};

#[derive(Default)]
pub struct MemStorage {
    users: RwLock<HashMap<String, User>>,
    credentials: RwLock<HashMap<String, Credential>>,
    attendance_records: RwLock<HashMap<String, AttendanceRecord>>,
    verification_logs: RwLock<HashMap<String, VerificationLog>>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, WalletError> {
    lock.read()
        .map_err(|_| WalletError::Storage("store lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, WalletError> {
    lock.write()
        .map_err(|_| WalletError::Storage("store lock poisoned".into()))
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl MemStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn get_user(&self, id: &str) -> Result<Option<User>, WalletError> {
        Ok(read(&self.users)?.get(id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, WalletError> {
        Ok(read(&self.users)?
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, WalletError> {
        let user = User {
            id: new_id(),
            username: user.username,
            password_hash: user.password_hash,
            name: user.name,
            student_id: user.student_id,
            institution: user.institution,
            course: user.course,
            year: user.year,
            email: user.email,
            phone: user.phone,
            is_admin: user.is_admin,
            created_at: Utc::now(),
        };
        write(&self.users)?.insert(user.id.clone(), user.clone());
        debug!("stored user {} ({})", user.id, user.username);
        Ok(user)
    }

    async fn get_credential(&self, id: &str) -> Result<Option<Credential>, WalletError> {
        Ok(read(&self.credentials)?.get(id).cloned())
    }

    async fn list_credentials_by_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<Credential>, WalletError> {
        let mut credentials: Vec<Credential> = read(&self.credentials)?
            .values()
            .filter(|credential| credential.student_id == student_id && credential.is_active)
            .cloned()
            .collect();
        credentials.sort_by(|a, b| a.issued_at.cmp(&b.issued_at));
        Ok(credentials)
    }

    async fn create_credential(
        &self,
        credential: NewCredential,
    ) -> Result<Credential, WalletError> {
        let credential = Credential {
            id: new_id(),
            student_id: credential.student_id,
            credential_type: credential.credential_type,
            data: credential.data,
            signature: credential.signature,
            issuer_id: credential.issuer_id,
            issued_at: Utc::now(),
            expires_at: credential.expires_at,
            is_active: true,
        };
        write(&self.credentials)?.insert(credential.id.clone(), credential.clone());
        debug!("stored credential {} for {}", credential.id, credential.student_id);
        Ok(credential)
    }

    async fn update_credential(
        &self,
        id: &str,
        update: CredentialUpdate,
    ) -> Result<Option<Credential>, WalletError> {
        let mut credentials = write(&self.credentials)?;
        Ok(credentials.get_mut(id).map(|credential| {
            update.apply_to(credential);
            credential.clone()
        }))
    }

    async fn create_attendance_record(
        &self,
        record: NewAttendanceRecord,
    ) -> Result<AttendanceRecord, WalletError> {
        let record = AttendanceRecord {
            id: new_id(),
            student_id: record.student_id,
            session_id: record.session_id,
            subject: record.subject,
            location: record.location,
            timestamp: Utc::now(),
            credential_id: None,
        };
        write(&self.attendance_records)?.insert(record.id.clone(), record.clone());
        debug!("stored attendance record {} for {}", record.id, record.student_id);
        Ok(record)
    }

    async fn link_attendance_credential(
        &self,
        record_id: &str,
        credential_id: &str,
    ) -> Result<Option<AttendanceRecord>, WalletError> {
        let mut records = write(&self.attendance_records)?;
        Ok(records.get_mut(record_id).map(|record| {
            record.credential_id = Some(credential_id.to_string());
            record.clone()
        }))
    }

    async fn remove_attendance_record(&self, id: &str) -> Result<bool, WalletError> {
        Ok(write(&self.attendance_records)?.remove(id).is_some())
    }

    async fn list_attendance_by_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<AttendanceRecord>, WalletError> {
        let mut records: Vec<AttendanceRecord> = read(&self.attendance_records)?
            .values()
            .filter(|record| record.student_id == student_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(records)
    }

    async fn create_verification_log(
        &self,
        log: NewVerificationLog,
    ) -> Result<VerificationLog, WalletError> {
        let log = VerificationLog {
            id: new_id(),
            credential_id: log.credential_id,
            verifier_id: log.verifier_id,
            verification_result: log.verification_result,
            timestamp: Utc::now(),
            details: log.details,
        };
        write(&self.verification_logs)?.insert(log.id.clone(), log.clone());
        Ok(log)
    }

    async fn list_verification_logs(&self) -> Result<Vec<VerificationLog>, WalletError> {
        let mut logs: Vec<VerificationLog> =
            read(&self.verification_logs)?.values().cloned().collect();
        logs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(logs)
    }
}
