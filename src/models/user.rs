// src/models/user.rs
//! User identity model.
//!
//! Users authenticate against the wallet and are the subjects credentials
//! are issued to. A student's `username` doubles as their student id and is
//! the subject reference stored on credentials and attendance records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered identity.
///
/// `username` is unique across all users. Uniqueness is enforced by the
/// registration flow, not by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    /// PBKDF2 hash string, never serialized
    pub password_hash: String,
    pub name: String,
    pub student_id: Option<String>,
    pub institution: Option<String>,
    pub course: Option<String>,
    pub year: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a user. The store assigns id and `created_at`.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub student_id: Option<String>,
    pub institution: Option<String>,
    pub course: Option<String>,
    pub year: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_admin: bool,
}

/// User projection returned over the API, without the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub name: String,
    pub student_id: Option<String>,
    pub institution: Option<String>,
    pub course: Option<String>,
    pub year: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_admin: bool,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        PublicUser {
            id: user.id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            student_id: user.student_id.clone(),
            institution: user.institution.clone(),
            course: user.course.clone(),
            year: user.year.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            is_admin: user.is_admin,
        }
    }
}
