//! Tuition request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tutorlink_core::{StudentId, TuitionRequestId, TuitionRequestStatus};

/// A student's open request for a tutor.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TuitionRequest {
    pub id: TuitionRequestId,
    pub student_id: StudentId,
    pub status: TuitionRequestStatus,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tuition request joined with the student fields shown in listings.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TuitionRequestDetail {
    pub id: TuitionRequestId,
    pub student_id: StudentId,
    pub status: TuitionRequestStatus,
    pub is_approved: bool,
    pub student_name: String,
    pub subjects: Vec<String>,
    pub grade: Option<String>,
    pub province: String,
    pub district: String,
    pub application_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Admin moderation of a tuition request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TuitionRequestUpdate {
    pub status: Option<TuitionRequestStatus>,
    pub is_approved: Option<bool>,
}

impl TuitionRequest {
    /// Whether teachers may still apply.
    #[must_use]
    pub fn accepts_applications(&self) -> bool {
        self.is_approved && self.status == TuitionRequestStatus::Active
    }
}
