//! Student (tuition seeker) types.

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tutorlink_core::{Email, Gender, RequestType, StudentId};

use crate::validation::{self, ValidationErrors};

/// A registered student or school.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub request_type: RequestType,
    pub name: String,
    pub phone: String,
    pub email: Option<Email>,
    pub gender: Option<Gender>,
    pub province: String,
    pub district: String,
    pub municipality: Option<String>,
    pub address: Option<String>,
    pub school_name: Option<String>,
    pub grade: Option<String>,
    pub subjects: Vec<String>,
    pub preferred_time_start: Option<NaiveTime>,
    pub preferred_time_end: Option<NaiveTime>,
    pub preferred_teacher_gender: Option<Gender>,
    pub budget: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration / edit form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudentInput {
    pub request_type: RequestType,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub province: String,
    pub district: String,
    pub municipality: Option<String>,
    pub address: Option<String>,
    pub school_name: Option<String>,
    pub grade: Option<String>,
    pub subjects: Vec<String>,
    /// `HH:MM` or `HH:MM:SS`.
    pub preferred_time_start: Option<String>,
    /// `HH:MM` or `HH:MM:SS`.
    pub preferred_time_end: Option<String>,
    pub preferred_teacher_gender: Option<Gender>,
    pub budget: Option<Decimal>,
    pub notes: Option<String>,
}

/// A validated student, ready to insert or overwrite an existing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub request_type: RequestType,
    pub name: String,
    pub phone: String,
    pub email: Option<Email>,
    pub gender: Option<Gender>,
    pub province: String,
    pub district: String,
    pub municipality: Option<String>,
    pub address: Option<String>,
    pub school_name: Option<String>,
    pub grade: Option<String>,
    pub subjects: Vec<String>,
    pub preferred_time_start: Option<NaiveTime>,
    pub preferred_time_end: Option<NaiveTime>,
    pub preferred_teacher_gender: Option<Gender>,
    pub budget: Option<Decimal>,
    pub notes: Option<String>,
}

fn parse_time(errors: &mut ValidationErrors, field: &str, value: Option<String>) -> Option<NaiveTime> {
    let raw = validation::optional_text(value)?;
    NaiveTime::parse_from_str(&raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
        .map_err(|_| errors.add(field, "must be a time like 16:30"))
        .ok()
}

impl StudentInput {
    /// Check the form and produce a [`NewStudent`].
    ///
    /// # Errors
    ///
    /// Returns every failing field at once.
    pub fn validate(self) -> Result<NewStudent, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = validation::required_text(&mut errors, "name", &self.name, 2);
        let phone = validation::phone(&mut errors, "phone", &self.phone);
        let email = validation::optional_email(&mut errors, "email", self.email);
        let province = validation::required_text(&mut errors, "province", &self.province, 2);
        let district = validation::required_text(&mut errors, "district", &self.district, 2);
        let subjects = validation::subjects(&mut errors, "subjects", self.subjects);

        let school_name = validation::optional_text(self.school_name);
        if self.request_type == RequestType::School && school_name.is_none() {
            errors.add("schoolName", "is required for school requests");
        }

        let preferred_time_start = parse_time(&mut errors, "preferredTimeStart", self.preferred_time_start);
        let preferred_time_end = parse_time(&mut errors, "preferredTimeEnd", self.preferred_time_end);
        if let (Some(start), Some(end)) = (preferred_time_start, preferred_time_end) {
            if start >= end {
                errors.add("preferredTimeEnd", "must be after the start time");
            }
        }

        if self.budget.is_some_and(|b| b.is_sign_negative()) {
            errors.add("budget", "cannot be negative");
        }

        errors.finish(NewStudent {
            request_type: self.request_type,
            name,
            phone,
            email,
            gender: self.gender,
            province,
            district,
            municipality: validation::optional_text(self.municipality),
            address: validation::optional_text(self.address),
            school_name,
            grade: validation::optional_text(self.grade),
            subjects,
            preferred_time_start,
            preferred_time_end,
            preferred_teacher_gender: self.preferred_teacher_gender,
            budget: self.budget,
            notes: validation::optional_text(self.notes),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn asha() -> StudentInput {
        StudentInput {
            name: "Asha".to_string(),
            phone: "9841234567".to_string(),
            province: "Bagmati".to_string(),
            district: "Kathmandu".to_string(),
            subjects: vec!["Math".to_string(), "English".to_string()],
            ..StudentInput::default()
        }
    }

    #[test]
    fn test_valid_student() {
        let student = asha().validate().unwrap();
        assert_eq!(student.name, "Asha");
        assert_eq!(student.subjects, vec!["Math", "English"]);
        assert_eq!(student.request_type, RequestType::Individual);
    }

    #[test]
    fn test_deserializes_camel_case_with_defaults() {
        let input: StudentInput = serde_json::from_value(serde_json::json!({
            "requestType": "school",
            "name": "Shree School",
            "schoolName": "Shree Secondary School",
            "phone": "014123456",
            "province": "Gandaki",
            "district": "Kaski",
            "subjects": ["Science"],
            "preferredTimeStart": "06:30",
            "preferredTimeEnd": "08:00"
        }))
        .unwrap();

        let student = input.validate().unwrap();
        assert_eq!(student.request_type, RequestType::School);
        assert_eq!(
            student.preferred_time_start,
            NaiveTime::from_hms_opt(6, 30, 0)
        );
    }

    #[test]
    fn test_reports_all_failures() {
        let errors = StudentInput::default().validate().unwrap_err();
        for field in ["name", "phone", "province", "district", "subjects"] {
            assert!(errors.field(field).is_some(), "missing error for {field}");
        }
    }

    #[test]
    fn test_school_requires_school_name() {
        let input = StudentInput {
            request_type: RequestType::School,
            ..asha()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field("schoolName").is_some());
    }

    #[test]
    fn test_time_window_must_be_ordered() {
        let input = StudentInput {
            preferred_time_start: Some("17:00".to_string()),
            preferred_time_end: Some("16:00".to_string()),
            ..asha()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field("preferredTimeEnd").is_some());

        let input = StudentInput {
            preferred_time_start: Some("teatime".to_string()),
            ..asha()
        };
        assert!(input.validate().unwrap_err().field("preferredTimeStart").is_some());
    }
}
