//! Integration tests for Tutorlink.
//!
//! # Running Tests
//!
//! ```bash
//! # Database scenarios: each test gets a fresh, migrated database
//! DATABASE_URL=postgres://localhost/tutorlink_test \
//!     cargo test -p tutorlink-integration-tests -- --ignored
//!
//! # HTTP smoke tests against a running server
//! ADMIN_BASE_URL=http://localhost:3001 cargo test -p tutorlink-integration-tests \
//!     --test http_smoke -- --ignored
//! ```
//!
//! This module holds fixtures shared by the test files.

use tutorlink_admin::models::{NewStudent, NewTeacher, StudentInput, TeacherInput};
use tutorlink_core::Gender;

/// A valid student from `province` studying `subjects`.
///
/// # Panics
///
/// Panics if the fixture fails validation.
#[must_use]
#[allow(clippy::expect_used)]
pub fn student(name: &str, province: &str, subjects: &[&str]) -> NewStudent {
    StudentInput {
        name: name.to_string(),
        phone: "9841000000".to_string(),
        province: province.to_string(),
        district: "Kathmandu".to_string(),
        subjects: subjects.iter().map(ToString::to_string).collect(),
        ..StudentInput::default()
    }
    .validate()
    .expect("student fixture is valid")
}

/// A valid teacher from `province` with an email address.
///
/// # Panics
///
/// Panics if the fixture fails validation.
#[must_use]
#[allow(clippy::expect_used)]
pub fn teacher(name: &str, province: &str) -> NewTeacher {
    TeacherInput {
        name: name.to_string(),
        phone: "9812345678".to_string(),
        email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
        gender: Some(Gender::Female),
        province: province.to_string(),
        district: "Pokhara".to_string(),
        qualification: "MSc Mathematics".to_string(),
        subjects: vec!["Math".to_string()],
        ..TeacherInput::default()
    }
    .validate()
    .expect("teacher fixture is valid")
}
