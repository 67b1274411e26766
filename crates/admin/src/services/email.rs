//! Outbound transactional email.
//!
//! Uses SMTP via lettre for delivery with Askama HTML and plain-text
//! templates. Sends are attempted once; failures are logged and returned to
//! the caller, never retried.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use tutorlink_core::TeacherCode;

use crate::config::EmailConfig;
use crate::models::TuitionRequestDetail;

const BRAND: &str = "Tutorlink";

// =============================================================================
// Templates
// =============================================================================

#[derive(Template)]
#[template(path = "email/approval.html")]
struct ApprovalHtml<'a> {
    name: &'a str,
    teacher_code: &'a str,
}

#[derive(Template)]
#[template(path = "email/approval.txt")]
struct ApprovalText<'a> {
    name: &'a str,
    teacher_code: &'a str,
}

#[derive(Template)]
#[template(path = "email/rejection.html")]
struct RejectionHtml<'a> {
    name: &'a str,
    reason: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "email/rejection.txt")]
struct RejectionText<'a> {
    name: &'a str,
    reason: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetHtml<'a> {
    name: &'a str,
    reset_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetText<'a> {
    name: &'a str,
    reset_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/office_invitation.html")]
struct OfficeInvitationHtml<'a> {
    invite: &'a OfficeInvitation,
}

#[derive(Template)]
#[template(path = "email/office_invitation.txt")]
struct OfficeInvitationText<'a> {
    invite: &'a OfficeInvitation,
}

#[derive(Template)]
#[template(path = "email/vacancy.html")]
struct VacancyHtml<'a> {
    name: &'a str,
    request: &'a TuitionRequestDetail,
    subjects: String,
}

#[derive(Template)]
#[template(path = "email/vacancy.txt")]
struct VacancyText<'a> {
    name: &'a str,
    request: &'a TuitionRequestDetail,
    subjects: String,
}

/// Details for an in-person office visit.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeInvitation {
    pub name: String,
    pub date: String,
    pub time: String,
    pub location: String,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Result of a broadcast to many recipients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct BroadcastOutcome {
    pub sent: usize,
    pub failed: usize,
}

// =============================================================================
// Service
// =============================================================================

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Tell a teacher their registration was approved.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to render or send.
    pub async fn send_approval(
        &self,
        to: &str,
        name: &str,
        teacher_code: &TeacherCode,
    ) -> Result<(), EmailError> {
        let teacher_code = teacher_code.as_str();
        let html = ApprovalHtml { name, teacher_code }.render()?;
        let text = ApprovalText { name, teacher_code }.render()?;

        self.send_multipart_email(to, &format!("Welcome to {BRAND}: you're approved"), &text, &html)
            .await
    }

    /// Tell a teacher their registration was not approved.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to render or send.
    pub async fn send_rejection(
        &self,
        to: &str,
        name: &str,
        reason: Option<&str>,
    ) -> Result<(), EmailError> {
        let html = RejectionHtml { name, reason }.render()?;
        let text = RejectionText { name, reason }.render()?;

        self.send_multipart_email(to, &format!("Your {BRAND} application"), &text, &html)
            .await
    }

    /// Send a password-reset link.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to render or send.
    pub async fn send_password_reset(
        &self,
        to: &str,
        name: &str,
        reset_url: &str,
    ) -> Result<(), EmailError> {
        let html = PasswordResetHtml { name, reset_url }.render()?;
        let text = PasswordResetText { name, reset_url }.render()?;

        self.send_multipart_email(to, &format!("Reset your {BRAND} password"), &text, &html)
            .await
    }

    /// Invite someone to the office.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to render or send.
    pub async fn send_office_invitation(
        &self,
        to: &str,
        invite: &OfficeInvitation,
    ) -> Result<(), EmailError> {
        let html = OfficeInvitationHtml { invite }.render()?;
        let text = OfficeInvitationText { invite }.render()?;

        self.send_multipart_email(to, &format!("Invitation to the {BRAND} office"), &text, &html)
            .await
    }

    /// Announce a tuition vacancy to one teacher.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to render or send.
    pub async fn send_vacancy(
        &self,
        to: &str,
        name: &str,
        request: &TuitionRequestDetail,
    ) -> Result<(), EmailError> {
        let subjects = request.subjects.join(", ");
        let html = VacancyHtml {
            name,
            request,
            subjects: subjects.clone(),
        }
        .render()?;
        let text = VacancyText {
            name,
            request,
            subjects: subjects.clone(),
        }
        .render()?;

        self.send_multipart_email(
            to,
            &format!("New tuition vacancy in {}: {subjects}", request.district),
            &text,
            &html,
        )
        .await
    }

    /// Announce a vacancy to each `(email, name)` recipient, one send at a time.
    pub async fn broadcast_vacancy(
        &self,
        recipients: &[(String, String)],
        request: &TuitionRequestDetail,
    ) -> BroadcastOutcome {
        let mut outcome = BroadcastOutcome::default();
        for (to, name) in recipients {
            match self.send_vacancy(to, name, request).await {
                Ok(()) => outcome.sent += 1,
                Err(e) => {
                    tracing::warn!(to = %to, error = %e, "Vacancy email failed");
                    outcome.failed += 1;
                }
            }
        }
        tracing::info!(
            request_id = %request.id,
            sent = outcome.sent,
            failed = outcome.failed,
            "Vacancy broadcast finished"
        );
        outcome
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tutorlink_core::{StudentId, TuitionRequestId, TuitionRequestStatus};

    fn request() -> TuitionRequestDetail {
        TuitionRequestDetail {
            id: TuitionRequestId::new(12),
            student_id: StudentId::new(4),
            status: TuitionRequestStatus::Active,
            is_approved: true,
            student_name: "Asha".to_string(),
            subjects: vec!["Math".to_string(), "English".to_string()],
            grade: Some("8".to_string()),
            province: "Bagmati".to_string(),
            district: "Kathmandu".to_string(),
            application_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_approval_templates_include_code() {
        let html = ApprovalHtml {
            name: "Ram",
            teacher_code: "TL-ABC234",
        }
        .render()
        .unwrap();
        let text = ApprovalText {
            name: "Ram",
            teacher_code: "TL-ABC234",
        }
        .render()
        .unwrap();
        assert!(html.contains("TL-ABC234"));
        assert!(text.contains("TL-ABC234"));
    }

    #[test]
    fn test_rejection_reason_is_optional() {
        let without = RejectionText {
            name: "Ram",
            reason: None,
        }
        .render()
        .unwrap();
        assert!(!without.contains("Reason"));

        let with = RejectionText {
            name: "Ram",
            reason: Some("Incomplete documents"),
        }
        .render()
        .unwrap();
        assert!(with.contains("Incomplete documents"));
    }

    #[test]
    fn test_html_is_escaped() {
        let html = PasswordResetHtml {
            name: "<script>",
            reset_url: "https://tutorlink.com.np/reset?t=1",
        }
        .render()
        .unwrap();
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_vacancy_lists_request_details() {
        let request = request();
        let text = VacancyText {
            name: "Sita",
            request: &request,
            subjects: request.subjects.join(", "),
        }
        .render()
        .unwrap();
        assert!(text.contains("Math, English"));
        assert!(text.contains("Kathmandu"));
        assert!(text.contains("12"));
    }

    #[test]
    fn test_office_invitation_deserializes() {
        let invite: OfficeInvitation = serde_json::from_value(serde_json::json!({
            "name": "Sita",
            "date": "2026-03-10",
            "time": "11:00",
            "location": "Putalisadak, Kathmandu"
        }))
        .unwrap();
        let text = OfficeInvitationText { invite: &invite }.render().unwrap();
        assert!(text.contains("Putalisadak"));
    }
}
