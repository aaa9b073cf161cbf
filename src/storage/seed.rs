// src/storage/seed.rs
//! Demo identities and credentials loaded at process start.
//!
//! The two demo credentials carry the placeholder signatures
//! `demo_signature` and `demo_signature_2`. They are listed like any other
//! credential but always fail signature verification.

use chrono::Utc;
use log::info;
use serde_json::json;

use super::Storage;
use crate::error::WalletError;
use crate::models::credential::{Credential, CredentialType, NewCredential};
use crate::models::user::{NewUser, User};
use crate::utils::crypto::hash_password;
use crate::utils::serialization::to_iso8601;
use crate::vc::envelope;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const DEMO_STUDENT_USERNAME: &str = "2024CSE001";
pub const DEMO_STUDENT_PASSWORD: &str = "student123";

/// Everything the seed step created.
#[derive(Debug, Clone)]
pub struct DemoData {
    pub admin: User,
    pub student: User,
    pub credentials: Vec<Credential>,
}

/// Seeds one admin, one demo student and two demo credentials.
///
/// # Arguments
/// * `store` - Target store, normally empty
/// * `registrar_issuer` - Issuer URI recorded in the demo envelopes
pub async fn seed_demo_data(
    store: &dyn Storage,
    registrar_issuer: &str,
) -> Result<DemoData, WalletError> {
    let admin = store
        .create_user(NewUser {
            username: ADMIN_USERNAME.into(),
            password_hash: hash_password(ADMIN_PASSWORD)?,
            name: "System Administrator".into(),
            institution: Some("CSVTU".into()),
            email: Some("admin@csvtu.ac.in".into()),
            is_admin: true,
            ..Default::default()
        })
        .await?;

    let student = store
        .create_user(NewUser {
            username: DEMO_STUDENT_USERNAME.into(),
            password_hash: hash_password(DEMO_STUDENT_PASSWORD)?,
            name: "Aksh Agrawal".into(),
            student_id: Some(DEMO_STUDENT_USERNAME.into()),
            institution: Some("Chhattisgarh Swami Vivekanand Technical University".into()),
            course: Some("BTech CSE (Data Science)".into()),
            year: Some("2".into()),
            email: Some("aksh@csvtu.ac.in".into()),
            phone: Some("+91-9876543210".into()),
            is_admin: false,
            ..Default::default()
        })
        .await?;

    let now = to_iso8601(Utc::now());
    let student_id_claims = json!({
        "name": student.name,
        "studentId": student.student_id,
        "course": student.course,
        "year": student.year,
        "institution": student.institution,
        "validFrom": now,
        "issuer": "CSVTU",
    });
    let attendance_claims = json!({
        "subject": "Data Structures & Algorithms",
        "date": now,
        "status": "Present",
        "location": "Room 301",
        "session": "Morning",
    });

    let mut credentials = Vec::with_capacity(2);
    for (credential_type, claims, signature) in [
        (CredentialType::StudentId, student_id_claims, "demo_signature"),
        (CredentialType::Attendance, attendance_claims, "demo_signature_2"),
    ] {
        let data = envelope::build(claims, registrar_issuer, credential_type.type_tag());
        let credential = store
            .create_credential(NewCredential {
                student_id: student.username.clone(),
                credential_type,
                data,
                signature: signature.to_string(),
                issuer_id: admin.id.clone(),
                expires_at: None,
            })
            .await?;
        credentials.push(credential);
    }

    info!(
        "seeded demo data: admin '{}', student '{}', {} credentials",
        admin.username,
        student.username,
        credentials.len()
    );
    Ok(DemoData {
        admin,
        student,
        credentials,
    })
}
