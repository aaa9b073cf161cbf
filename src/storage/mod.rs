// src/storage/mod.rs
//! Credential store.
//!
//! The [`Storage`] trait is the only way services reach users, credentials,
//! attendance records and verification logs. Every operation may suspend,
//! so a durable backend can slot in behind the same interface as
//! [`memory::MemStorage`].

use async_trait::async_trait;

use crate::error::WalletError;
use crate::models::attendance::{AttendanceRecord, NewAttendanceRecord};
use crate::models::credential::{Credential, CredentialUpdate, NewCredential};
use crate::models::user::{NewUser, User};
use crate::models::verification::{NewVerificationLog, VerificationLog};

pub mod memory;
pub mod seed;

/// Keyed persistence for every wallet entity.
///
/// Implementations must be safe under concurrent calls: ids come from a
/// globally unique generator, and readers never observe a partially
/// written entity.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_user(&self, id: &str) -> Result<Option<User>, WalletError>;

    /// Linear lookup by username. Returns the first match.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, WalletError>;

    /// Assigns a fresh id and creation timestamp. Does not dedupe usernames.
    async fn create_user(&self, user: NewUser) -> Result<User, WalletError>;

    async fn get_credential(&self, id: &str) -> Result<Option<Credential>, WalletError>;

    /// Active credentials held by `student_id`.
    async fn list_credentials_by_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<Credential>, WalletError>;

    /// Assigns a fresh id, sets `issued_at` to now and `is_active` to true.
    async fn create_credential(&self, credential: NewCredential)
        -> Result<Credential, WalletError>;

    /// Merges `update` into the stored credential atomically.
    ///
    /// Returns `Ok(None)` when `id` is unknown.
    async fn update_credential(
        &self,
        id: &str,
        update: CredentialUpdate,
    ) -> Result<Option<Credential>, WalletError>;

    /// Assigns a fresh id and timestamp.
    async fn create_attendance_record(
        &self,
        record: NewAttendanceRecord,
    ) -> Result<AttendanceRecord, WalletError>;

    /// Records which credential was minted for a check-in.
    async fn link_attendance_credential(
        &self,
        record_id: &str,
        credential_id: &str,
    ) -> Result<Option<AttendanceRecord>, WalletError>;

    /// Compensating delete for a check-in whose credential could not be issued.
    async fn remove_attendance_record(&self, id: &str) -> Result<bool, WalletError>;

    async fn list_attendance_by_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<AttendanceRecord>, WalletError>;

    /// Appends an audit entry with a fresh id and timestamp.
    async fn create_verification_log(
        &self,
        log: NewVerificationLog,
    ) -> Result<VerificationLog, WalletError>;

    async fn list_verification_logs(&self) -> Result<Vec<VerificationLog>, WalletError>;
}
