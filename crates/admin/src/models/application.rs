//! Teacher applications to tuition requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tutorlink_core::{
    ApplicationId, ApplicationStatus, TeacherCode, TeacherId, TuitionRequestId,
};

use crate::validation::ValidationErrors;

/// An application joined with the teacher and student it connects.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetail {
    pub id: ApplicationId,
    pub teacher_id: TeacherId,
    pub tuition_request_id: TuitionRequestId,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub teacher_code: TeacherCode,
    pub teacher_name: String,
    pub teacher_phone: String,
    pub student_name: String,
    pub subjects: Vec<String>,
    pub district: String,
}

/// Public application form: a teacher identifies themself by code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplicationInput {
    pub teacher_code: String,
    pub tuition_request_id: Option<i32>,
}

/// Validated [`ApplicationInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub teacher_code: TeacherCode,
    pub tuition_request_id: TuitionRequestId,
}

impl ApplicationInput {
    /// # Errors
    ///
    /// Rejects a malformed teacher code or a missing request id.
    pub fn validate(self) -> Result<NewApplication, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let teacher_code = TeacherCode::parse(&self.teacher_code)
            .map_err(|e| errors.add("teacherCode", e.to_string()))
            .ok();
        let tuition_request_id = self.tuition_request_id.map(TuitionRequestId::new);
        if tuition_request_id.is_none() {
            errors.add("tuitionRequestId", "is required");
        }

        match (teacher_code, tuition_request_id) {
            (Some(teacher_code), Some(tuition_request_id)) if errors.is_empty() => {
                Ok(NewApplication {
                    teacher_code,
                    tuition_request_id,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Admin decision on an application.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ApplicationDecision {
    pub status: ApplicationStatus,
}
