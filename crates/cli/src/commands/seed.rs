//! Seed a database from a YAML file.
//!
//! Every record is validated before anything is written, so a bad file
//! leaves the database untouched.
//!
//! ```yaml
//! admins:
//!   - email: admin@tutorlink.com.np
//!     name: Office Admin
//!     password: change-me-please
//! students:
//!   - name: Asha Gurung
//!     phone: "9841000000"
//!     province: Bagmati
//!     district: Kathmandu
//!     subjects: [Math, Science]
//! teachers:
//!   - name: Ram Shrestha
//!     phone: "9812345678"
//!     gender: male
//!     province: Bagmati
//!     district: Lalitpur
//!     qualification: BSc
//!     subjects: [Math]
//!     approved: true
//! notices:
//!   - text: Admissions open for the new session
//! testimonials:
//!   - name: Sita
//!     role: parent
//!     message: Found a great tutor in a week.
//!     rating: 5
//! ```

use std::path::Path;

use serde::Deserialize;

use tutorlink_admin::db::{NoticeRepository, TeacherRepository, TestimonialRepository};
use tutorlink_admin::models::{
    NewNotice, NewStudent, NewTeacher, NewTestimonial, NoticeInput, StudentInput, TeacherInput,
    TestimonialInput,
};
use tutorlink_admin::services::{AdminAuthService, RegistrationService};

/// Admin account entry; the password is hashed on insert.
#[derive(Debug, Deserialize)]
pub struct AdminSeed {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Teacher entry with an optional approval flag.
#[derive(Debug, Deserialize)]
pub struct TeacherSeed {
    #[serde(flatten)]
    pub teacher: TeacherInput,
    #[serde(default)]
    pub approved: bool,
}

/// Contents of a seed file. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    pub admins: Vec<AdminSeed>,
    pub students: Vec<StudentInput>,
    pub teachers: Vec<TeacherSeed>,
    pub notices: Vec<NoticeInput>,
    pub testimonials: Vec<TestimonialInput>,
}

/// A seed file whose records all passed validation.
#[derive(Debug, Default)]
pub struct ValidSeed {
    pub admins: Vec<AdminSeed>,
    pub students: Vec<NewStudent>,
    pub teachers: Vec<(NewTeacher, bool)>,
    pub notices: Vec<NewNotice>,
    pub testimonials: Vec<NewTestimonial>,
}

/// Rows written by [`run`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub admins: usize,
    pub students: usize,
    pub teachers: usize,
    pub notices: usize,
    pub testimonials: usize,
}

/// Errors that can occur while seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{} invalid record(s) in seed file", .0.len())]
    Invalid(Vec<String>),

    #[error(transparent)]
    Connect(#[from] super::ConnectError),

    #[error("{0}")]
    Write(String),
}

impl SeedFile {
    /// Parse YAML text.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Parse` for malformed YAML.
    pub fn parse(yaml: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Validate every record, collecting one line per failure.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Invalid` listing each bad record by section and index.
    pub fn validate(self) -> Result<ValidSeed, SeedError> {
        let mut problems = Vec::new();
        let mut valid = ValidSeed::default();

        for (i, admin) in self.admins.into_iter().enumerate() {
            if let Err(e) = tutorlink_admin::services::auth::validate_password(&admin.password) {
                problems.push(format!("admins[{i}]: {e}"));
            } else {
                valid.admins.push(admin);
            }
        }
        for (i, student) in self.students.into_iter().enumerate() {
            match student.validate() {
                Ok(s) => valid.students.push(s),
                Err(e) => problems.push(format!("students[{i}]: {e}")),
            }
        }
        for (i, seed) in self.teachers.into_iter().enumerate() {
            match seed.teacher.validate() {
                Ok(t) => valid.teachers.push((t, seed.approved)),
                Err(e) => problems.push(format!("teachers[{i}]: {e}")),
            }
        }
        for (i, notice) in self.notices.into_iter().enumerate() {
            match notice.validate() {
                Ok(n) => valid.notices.push(n),
                Err(e) => problems.push(format!("notices[{i}]: {e}")),
            }
        }
        for (i, testimonial) in self.testimonials.into_iter().enumerate() {
            match testimonial.validate() {
                Ok(t) => valid.testimonials.push(t),
                Err(e) => problems.push(format!("testimonials[{i}]: {e}")),
            }
        }

        if problems.is_empty() {
            Ok(valid)
        } else {
            Err(SeedError::Invalid(problems))
        }
    }
}

/// Load, validate and insert a seed file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any record is
/// invalid, or a write fails. Writes made before a failure are kept.
pub async fn run(file_path: &Path) -> Result<SeedSummary, SeedError> {
    tracing::info!(path = %file_path.display(), "Loading seed file");
    let content = tokio::fs::read_to_string(file_path).await?;

    let seed = match SeedFile::parse(&content)?.validate() {
        Ok(seed) => seed,
        Err(SeedError::Invalid(problems)) => {
            tracing::error!("Seed file validation failed:");
            for problem in &problems {
                tracing::error!("  - {problem}");
            }
            return Err(SeedError::Invalid(problems));
        }
        Err(e) => return Err(e),
    };

    let pool = super::connect().await?;
    let write = |e: &dyn std::fmt::Display| SeedError::Write(e.to_string());
    let mut summary = SeedSummary::default();

    let auth = AdminAuthService::new(&pool);
    for admin in &seed.admins {
        auth.create_admin(&admin.email, &admin.name, &admin.password)
            .await
            .map_err(|e| write(&e))?;
        summary.admins += 1;
    }

    let registration = RegistrationService::new(&pool);
    for student in &seed.students {
        registration
            .register_student(student)
            .await
            .map_err(|e| write(&e))?;
        summary.students += 1;
    }

    let teachers = TeacherRepository::new(&pool);
    for (teacher, approved) in &seed.teachers {
        let created = registration
            .register_teacher(teacher)
            .await
            .map_err(|e| write(&e))?;
        if *approved {
            teachers
                .set_approved(created.id, true)
                .await
                .map_err(|e| write(&e))?;
        }
        summary.teachers += 1;
    }

    let notices = NoticeRepository::new(&pool);
    for notice in &seed.notices {
        notices.create(notice).await.map_err(|e| write(&e))?;
        summary.notices += 1;
    }

    let testimonials = TestimonialRepository::new(&pool);
    for testimonial in &seed.testimonials {
        testimonials.create(testimonial).await.map_err(|e| write(&e))?;
        summary.testimonials += 1;
    }

    tracing::info!("Seeding complete!");
    tracing::info!("  Admins: {}", summary.admins);
    tracing::info!("  Students: {}", summary.students);
    tracing::info!("  Teachers: {}", summary.teachers);
    tracing::info!("  Notices: {}", summary.notices);
    tracing::info!("  Testimonials: {}", summary.testimonials);

    Ok(summary)
}
