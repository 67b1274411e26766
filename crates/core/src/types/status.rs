//! Status and category enums shared by the admin API and the database.
//!
//! With the `postgres` feature each enum maps onto a Postgres enum type in
//! the `tutorlink` schema (see `crates/admin/migrations`).

use serde::{Deserialize, Serialize};

/// Lifecycle of a tuition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "tutorlink.tuition_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum TuitionRequestStatus {
    /// Open for teacher applications.
    #[default]
    Active,
    /// A teacher's application was approved.
    Assigned,
    /// No longer accepting applications.
    Closed,
}

impl TuitionRequestStatus {
    /// Database/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Assigned => "assigned",
            Self::Closed => "closed",
        }
    }
}

/// Review state of a teacher's application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "tutorlink.application_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    /// Database/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// What produced a back-office notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "tutorlink.notification_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    StudentRegistration,
    TeacherRegistration,
    TuitionApplication,
    System,
}

impl NotificationType {
    /// Database/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StudentRegistration => "student_registration",
            Self::TeacherRegistration => "teacher_registration",
            Self::TuitionApplication => "tuition_application",
            Self::System => "system",
        }
    }
}

/// Who wrote a testimonial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "tutorlink.testimonial_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum TestimonialRole {
    Student,
    Parent,
    Teacher,
}

/// Gender as recorded on student and teacher profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "tutorlink.gender", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Database/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

/// Whether a student registration is for one learner or a school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "tutorlink.request_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    #[default]
    Individual,
    School,
}

macro_rules! impl_display_via_as_str {
    ($($ty:ty),+) => {
        $(
            impl ::core::fmt::Display for $ty {
                fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

impl_display_via_as_str!(TuitionRequestStatus, ApplicationStatus, NotificationType, Gender);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_matches_as_str() {
        for status in [
            TuitionRequestStatus::Active,
            TuitionRequestStatus::Assigned,
            TuitionRequestStatus::Closed,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }

        let json = serde_json::to_string(&NotificationType::StudentRegistration).unwrap();
        assert_eq!(json, "\"student_registration\"");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TuitionRequestStatus::default(), TuitionRequestStatus::Active);
        assert_eq!(ApplicationStatus::default(), ApplicationStatus::Pending);
        assert_eq!(RequestType::default(), RequestType::Individual);
    }

    #[test]
    fn test_unknown_variant_rejected() {
        assert!(serde_json::from_str::<Gender>("\"unknown\"").is_err());
        assert_eq!(
            serde_json::from_str::<TestimonialRole>("\"parent\"").unwrap(),
            TestimonialRole::Parent
        );
    }
}
