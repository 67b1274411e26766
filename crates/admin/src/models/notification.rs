//! Back-office notifications.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tutorlink_core::{NotificationId, NotificationType, TeacherCode};

/// An entry in the admin activity feed.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: NotificationType,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification about to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub kind: NotificationType,
}

impl NewNotification {
    /// A student or school has registered.
    #[must_use]
    pub fn student_registered(name: &str, district: &str) -> Self {
        Self {
            title: "New student registration".to_string(),
            message: format!("{name} from {district} has requested a tutor."),
            kind: NotificationType::StudentRegistration,
        }
    }

    /// A teacher has registered and awaits approval.
    #[must_use]
    pub fn teacher_registered(name: &str, code: &TeacherCode) -> Self {
        Self {
            title: "New teacher registration".to_string(),
            message: format!("{name} ({code}) has registered and is awaiting approval."),
            kind: NotificationType::TeacherRegistration,
        }
    }

    /// A teacher applied to a tuition request.
    #[must_use]
    pub fn tuition_application(code: &TeacherCode, student_name: &str) -> Self {
        Self {
            title: "New tuition application".to_string(),
            message: format!("Teacher {code} applied to teach {student_name}."),
            kind: NotificationType::TuitionApplication,
        }
    }
}
