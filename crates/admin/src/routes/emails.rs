//! Admin-triggered outbound email.
//!
//! Each endpoint validates its body, sends once and reports the outcome.
//! Provider failures come back as `502` with `success: false`.

use axum::{
    Json, Router,
    extract::State,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tutorlink_core::{Email, TeacherCode, TuitionRequestId};

use crate::db::{TeacherRepository, TuitionRequestRepository};
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::middleware::RequireAdmin;
use crate::services::{BroadcastOutcome, OfficeInvitation};
use crate::state::AppState;
use crate::validation::{self, ValidationErrors};

use super::{ApiMessage, done};

/// Build the emails router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/emails/approval", post(approval))
        .route("/api/admin/emails/rejection", post(rejection))
        .route("/api/admin/emails/password-reset", post(password_reset))
        .route("/api/admin/emails/office-invitation", post(office_invitation))
        .route("/api/admin/emails/vacancy", post(vacancy))
}

// =============================================================================
// Request bodies
// =============================================================================

/// `POST /api/admin/emails/approval`
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApprovalEmail {
    pub to: Option<String>,
    pub name: String,
    pub teacher_code: String,
}

/// `POST /api/admin/emails/rejection`
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RejectionEmail {
    pub to: Option<String>,
    pub name: String,
    pub reason: Option<String>,
}

/// `POST /api/admin/emails/password-reset`
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PasswordResetEmail {
    pub to: Option<String>,
    pub name: String,
    pub reset_url: String,
}

/// `POST /api/admin/emails/office-invitation`
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OfficeInvitationEmail {
    pub to: Option<String>,
    pub name: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub notes: Option<String>,
}

/// `POST /api/admin/emails/vacancy`
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VacancyEmail {
    pub tuition_request_id: Option<i32>,
}

/// Validated recipient and name shared by the single-recipient emails.
struct Recipient {
    to: Email,
    name: String,
}

fn recipient(errors: &mut ValidationErrors, to: Option<String>, name: &str) -> Option<Recipient> {
    let to = validation::required_email(errors, "to", to);
    let name = validation::required_text(errors, "name", name, 1);
    to.map(|to| Recipient { to, name })
}

impl ApprovalEmail {
    fn validate(self) -> Result<(Recipient, TeacherCode), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let recipient = recipient(&mut errors, self.to, &self.name);
        let code = TeacherCode::parse(&self.teacher_code)
            .map_err(|e| errors.add("teacherCode", e.to_string()))
            .ok();

        match (recipient, code) {
            (Some(recipient), Some(code)) if errors.is_empty() => Ok((recipient, code)),
            _ => Err(errors),
        }
    }
}

impl PasswordResetEmail {
    fn validate(self) -> Result<(Recipient, String), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let recipient = recipient(&mut errors, self.to, &self.name);
        let reset_url = if self.reset_url.trim().is_empty() {
            errors.add("resetUrl", "is required");
            String::new()
        } else {
            validation::http_url(&mut errors, "resetUrl", &self.reset_url)
        };

        match recipient {
            Some(recipient) if errors.is_empty() => Ok((recipient, reset_url)),
            _ => Err(errors),
        }
    }
}

impl OfficeInvitationEmail {
    fn validate(self) -> Result<(Email, OfficeInvitation), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let recipient = recipient(&mut errors, self.to, &self.name);
        let date = validation::required_text(&mut errors, "date", &self.date, 1);
        let time = validation::required_text(&mut errors, "time", &self.time, 1);
        let location = validation::required_text(&mut errors, "location", &self.location, 1);

        match recipient {
            Some(Recipient { to, name }) if errors.is_empty() => Ok((
                to,
                OfficeInvitation {
                    name,
                    date,
                    time,
                    location,
                    notes: validation::optional_text(self.notes),
                },
            )),
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

#[instrument(skip_all)]
async fn approval(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ApprovalEmail>,
) -> Result<Json<ApiMessage>, AppError> {
    let (recipient, code) = body.validate()?;

    state
        .email()
        .send_approval(recipient.to.as_str(), &recipient.name, &code)
        .await?;

    Ok(done("Approval email sent"))
}

#[instrument(skip_all)]
async fn rejection(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RejectionEmail>,
) -> Result<Json<ApiMessage>, AppError> {
    let mut errors = ValidationErrors::new();
    let recipient = recipient(&mut errors, body.to, &body.name);
    let Some(recipient) = recipient.filter(|_| errors.is_empty()) else {
        return Err(errors.into());
    };
    let reason = validation::optional_text(body.reason);

    state
        .email()
        .send_rejection(recipient.to.as_str(), &recipient.name, reason.as_deref())
        .await?;

    Ok(done("Rejection email sent"))
}

#[instrument(skip_all)]
async fn password_reset(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<PasswordResetEmail>,
) -> Result<Json<ApiMessage>, AppError> {
    let (recipient, reset_url) = body.validate()?;

    state
        .email()
        .send_password_reset(recipient.to.as_str(), &recipient.name, &reset_url)
        .await?;

    Ok(done("Password reset email sent"))
}

#[instrument(skip_all)]
async fn office_invitation(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<OfficeInvitationEmail>,
) -> Result<Json<ApiMessage>, AppError> {
    let (to, invite) = body.validate()?;

    state
        .email()
        .send_office_invitation(to.as_str(), &invite)
        .await?;

    Ok(done("Office invitation sent"))
}

/// Broadcast result.
#[derive(Debug, Serialize)]
pub struct VacancyBroadcast {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: BroadcastOutcome,
}

/// Announce a tuition request to every approved teacher with an email.
///
/// One failed recipient does not stop the rest; the counts say how it went.
#[instrument(skip_all)]
async fn vacancy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<VacancyEmail>,
) -> Result<Json<VacancyBroadcast>, AppError> {
    let id = body
        .tuition_request_id
        .map(TuitionRequestId::new)
        .ok_or_else(|| AppError::invalid("tuitionRequestId", "is required"))?;

    let request = TuitionRequestRepository::new(state.pool())
        .get_detail(id)
        .await?
        .ok_or(AppError::NotFound("Tuition request"))?;

    let recipients: Vec<(String, String)> = TeacherRepository::new(state.pool())
        .list_approved_with_email()
        .await?
        .into_iter()
        .filter_map(|t| t.email.map(|email| (email.into_inner(), t.name)))
        .collect();

    let outcome = state.email().broadcast_vacancy(&recipients, &request).await;
    tracing::info!(
        tuition_request_id = %id,
        admin_id = %admin.id,
        sent = outcome.sent,
        failed = outcome.failed,
        "Vacancy broadcast finished"
    );

    Ok(Json(VacancyBroadcast {
        success: outcome.failed == 0,
        outcome,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_requires_valid_fields() {
        let errors = ApprovalEmail {
            to: Some("not-an-email".to_string()),
            name: String::new(),
            teacher_code: "XX-1".to_string(),
        }
        .validate()
        .err()
        .unwrap();

        assert!(errors.field("to").is_some());
        assert!(errors.field("name").is_some());
        assert!(errors.field("teacherCode").is_some());
    }

    #[test]
    fn test_approval_accepts_good_body() {
        let (recipient, code) = ApprovalEmail {
            to: Some("ram@example.com".to_string()),
            name: "Ram".to_string(),
            teacher_code: "TL-7KX2QF".to_string(),
        }
        .validate()
        .ok()
        .unwrap();

        assert_eq!(recipient.to.as_str(), "ram@example.com");
        assert_eq!(code.as_str(), "TL-7KX2QF");
    }

    #[test]
    fn test_password_reset_url_must_be_http() {
        let errors = PasswordResetEmail {
            to: Some("asha@example.com".to_string()),
            name: "Asha".to_string(),
            reset_url: "javascript:alert(1)".to_string(),
        }
        .validate()
        .err()
        .unwrap();
        assert!(errors.field("resetUrl").is_some());

        let missing = PasswordResetEmail {
            to: Some("asha@example.com".to_string()),
            name: "Asha".to_string(),
            reset_url: String::new(),
        }
        .validate()
        .err()
        .unwrap();
        assert_eq!(missing.field("resetUrl").unwrap(), ["is required"]);
    }

    #[test]
    fn test_office_invitation_fields() {
        let body: OfficeInvitationEmail = serde_json::from_value(serde_json::json!({
            "to": "ram@example.com",
            "name": "Ram",
            "date": "2026-03-14",
            "time": "11:00",
            "location": "Tutorlink office, Kathmandu",
        }))
        .unwrap();
        let (to, invite) = body.validate().ok().unwrap();
        assert_eq!(to.as_str(), "ram@example.com");
        assert_eq!(invite.location, "Tutorlink office, Kathmandu");
        assert!(invite.notes.is_none());

        let errors = OfficeInvitationEmail::default().validate().err().unwrap();
        for field in ["to", "name", "date", "time", "location"] {
            assert!(errors.field(field).is_some(), "{field}");
        }
    }

    #[test]
    fn test_broadcast_body_shape() {
        let body = serde_json::to_value(VacancyBroadcast {
            success: false,
            outcome: BroadcastOutcome { sent: 3, failed: 1 },
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"success": false, "sent": 3, "failed": 1}));
    }
}
