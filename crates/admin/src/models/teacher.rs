//! Teacher (tutor) types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tutorlink_core::{Email, Gender, TeacherCode, TeacherId};

use crate::validation::{self, ValidationErrors};

/// Highest priority an admin can assign.
pub const MAX_PRIORITY: i32 = 100;

/// A registered teacher.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: TeacherId,
    pub teacher_code: TeacherCode,
    pub name: String,
    pub phone: String,
    pub email: Option<Email>,
    pub gender: Gender,
    pub province: String,
    pub district: String,
    pub address: Option<String>,
    pub qualification: String,
    pub experience_years: Option<i32>,
    pub subjects: Vec<String>,
    pub cv_url: Option<String>,
    pub photo_url: Option<String>,
    pub is_approved: bool,
    pub level: Option<String>,
    pub priority: i32,
    pub left_payment: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration / profile form as submitted.
///
/// Carries no `teacherCode`: the code is generated once at registration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeacherInput {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub province: String,
    pub district: String,
    pub address: Option<String>,
    pub qualification: String,
    pub experience_years: Option<i32>,
    pub subjects: Vec<String>,
    pub cv_url: Option<String>,
    pub photo_url: Option<String>,
}

/// Validated teacher profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeacher {
    pub name: String,
    pub phone: String,
    pub email: Option<Email>,
    pub gender: Gender,
    pub province: String,
    pub district: String,
    pub address: Option<String>,
    pub qualification: String,
    pub experience_years: Option<i32>,
    pub subjects: Vec<String>,
    pub cv_url: Option<String>,
    pub photo_url: Option<String>,
}

impl TeacherInput {
    /// Check the form and produce a [`NewTeacher`].
    ///
    /// # Errors
    ///
    /// Returns every failing field at once.
    pub fn validate(self) -> Result<NewTeacher, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = validation::required_text(&mut errors, "name", &self.name, 2);
        let phone = validation::phone(&mut errors, "phone", &self.phone);
        let email = validation::optional_email(&mut errors, "email", self.email);
        let province = validation::required_text(&mut errors, "province", &self.province, 2);
        let district = validation::required_text(&mut errors, "district", &self.district, 2);
        let qualification =
            validation::required_text(&mut errors, "qualification", &self.qualification, 2);
        let subjects = validation::subjects(&mut errors, "subjects", self.subjects);
        let cv_url = validation::optional_http_url(&mut errors, "cvUrl", self.cv_url);
        let photo_url = validation::optional_http_url(&mut errors, "photoUrl", self.photo_url);

        let gender = self.gender.unwrap_or_else(|| {
            errors.add("gender", "is required");
            Gender::Other
        });

        if self.experience_years.is_some_and(|y| !(0..=80).contains(&y)) {
            errors.add("experienceYears", "must be between 0 and 80");
        }

        errors.finish(NewTeacher {
            name,
            phone,
            email,
            gender,
            province,
            district,
            address: validation::optional_text(self.address),
            qualification,
            experience_years: self.experience_years,
            subjects,
            cv_url,
            photo_url,
        })
    }
}

/// Admin-only fields: level, priority and outstanding payment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeacherAdminUpdate {
    pub level: Option<String>,
    pub priority: i32,
    pub left_payment: Decimal,
}

/// Validated [`TeacherAdminUpdate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherStanding {
    pub level: Option<String>,
    pub priority: i32,
    pub left_payment: Decimal,
}

impl TeacherAdminUpdate {
    /// # Errors
    ///
    /// Rejects a priority outside 0-100 or a negative outstanding payment.
    pub fn validate(self) -> Result<TeacherStanding, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !(0..=MAX_PRIORITY).contains(&self.priority) {
            errors.add("priority", format!("must be between 0 and {MAX_PRIORITY}"));
        }
        if self.left_payment.is_sign_negative() && !self.left_payment.is_zero() {
            errors.add("leftPayment", "cannot be negative");
        }
        errors.finish(TeacherStanding {
            level: validation::optional_text(self.level),
            priority: self.priority,
            left_payment: self.left_payment,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ram() -> TeacherInput {
        TeacherInput {
            name: "Ram Shrestha".to_string(),
            phone: "9800000000".to_string(),
            email: Some("ram@example.com".to_string()),
            gender: Some(Gender::Male),
            province: "Bagmati".to_string(),
            district: "Lalitpur".to_string(),
            qualification: "M.Sc. Physics".to_string(),
            subjects: vec!["Physics".to_string()],
            ..TeacherInput::default()
        }
    }

    #[test]
    fn test_valid_teacher() {
        let teacher = ram().validate().unwrap();
        assert_eq!(teacher.gender, Gender::Male);
        assert_eq!(teacher.email.unwrap().as_str(), "ram@example.com");
    }

    #[test]
    fn test_gender_and_urls_checked() {
        let input = TeacherInput {
            gender: None,
            cv_url: Some("ftp://files/cv.pdf".to_string()),
            ..ram()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field("gender").is_some());
        assert!(errors.field("cvUrl").is_some());
    }

    #[test]
    fn test_teacher_code_is_not_an_input() {
        let input: TeacherInput = serde_json::from_value(serde_json::json!({
            "name": "Sita",
            "teacherCode": "TL-AAAAAA",
        }))
        .unwrap();
        assert_eq!(input.name, "Sita");
    }

    #[test]
    fn test_standing_bounds() {
        let ok = TeacherAdminUpdate {
            level: Some(" Senior ".to_string()),
            priority: 10,
            left_payment: Decimal::new(150_000, 2),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.level.as_deref(), Some("Senior"));

        let errors = TeacherAdminUpdate {
            level: None,
            priority: 101,
            left_payment: Decimal::new(-1, 0),
        }
        .validate()
        .unwrap_err();
        assert!(errors.field("priority").is_some());
        assert!(errors.field("leftPayment").is_some());
    }
}
