// src/models/attendance.rs
//! Attendance check-in records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One check-in event for a student in a session.
///
/// `credential_id` links to the attendance credential minted for the
/// check-in. Records are never deleted once a check-in completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub student_id: String,
    pub session_id: String,
    pub subject: Option<String>,
    pub location: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub credential_id: Option<String>,
}

/// Insert payload for an attendance record. The store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewAttendanceRecord {
    pub student_id: String,
    pub session_id: String,
    pub subject: Option<String>,
    pub location: Option<String>,
}
