//! Unified error handling for admin.
//!
//! Every handler returns `Result<_, AppError>`. Failures are rendered as
//! `{"success": false, "message": ..., "errors"?: {field: [messages]}}`.
//! Database and email failures are logged and reported to Sentry, and the
//! client only sees a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AdminAuthError, EmailError, RegistrationError};
use crate::validation::ValidationErrors;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input failed validation.
    #[error("Validation failed")]
    Validation(ValidationErrors),

    /// Login failed.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No valid admin session.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Email provider failed.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a single-field validation error.
    #[must_use]
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::single(field, message))
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Email(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a ValidationErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_) | Self::Email(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Email(_) => "Failed to send email".to_string(),
            _ => self.to_string(),
        };

        let errors = match &self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        };

        let body = ErrorBody {
            success: false,
            message,
            errors,
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("Record"),
            other => Self::Database(other),
        }
    }
}

impl From<AdminAuthError> for AppError {
    fn from(err: AdminAuthError) -> Self {
        match err {
            AdminAuthError::InvalidCredentials => Self::InvalidCredentials,
            AdminAuthError::Unauthorized => Self::Unauthorized,
            AdminAuthError::InvalidCurrentPassword => {
                Self::invalid("currentPassword", "Current password is incorrect")
            }
            AdminAuthError::Mismatch => Self::invalid("confirmPassword", "Passwords do not match"),
            e @ AdminAuthError::TooShort { .. } => Self::invalid("newPassword", e.to_string()),
            e @ AdminAuthError::AlreadyExists => Self::invalid("email", e.to_string()),
            AdminAuthError::InvalidEmail(e) => Self::invalid("email", e.to_string()),
            AdminAuthError::PasswordHash => Self::Internal("password hashing failed".to_string()),
            AdminAuthError::Repository(e) => e.into(),
        }
    }
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::TeacherNotFound => Self::NotFound("Teacher"),
            RegistrationError::RequestNotFound => Self::NotFound("Tuition request"),
            e @ RegistrationError::TeacherNotApproved => Self::invalid("teacherCode", e.to_string()),
            e @ (RegistrationError::RequestNotOpen | RegistrationError::AlreadyApplied) => {
                Self::invalid("tuitionRequestId", e.to_string())
            }
            e @ (RegistrationError::CodeExhausted | RegistrationError::Code(_)) => {
                Self::Internal(e.to_string())
            }
            RegistrationError::Repository(e) => e.into(),
        }
    }
}

/// Set the Sentry user context from an admin.
pub fn set_sentry_user(admin_id: i32, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let (status, body) = body_json(AppError::invalid("rating", "too high")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "message": "Validation failed",
                "errors": {"rating": ["too high"]}
            })
        );
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let (status, body) = body_json(AppError::Internal("pool exhausted".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_auth_messages_are_generic() {
        let (status, body) = body_json(AdminAuthError::InvalidCredentials.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid email or password");

        let (status, body) = body_json(AdminAuthError::Unauthorized.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthorized");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::from(RepositoryError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(RepositoryError::Conflict("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(AdminAuthError::TooShort { min: 8 }).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(RegistrationError::AlreadyApplied).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(RegistrationError::TeacherNotFound).to_string(),
            "Teacher not found"
        );
    }
}
