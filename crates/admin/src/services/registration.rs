//! Multi-step writes: registrations and applications.
//!
//! Each flow writes its rows and the matching back-office notification in
//! one transaction, so a failure part-way leaves nothing behind.

use rand::seq::IndexedRandom;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use tutorlink_core::{ApplicationId, ApplicationStatus, TeacherCode, TeacherCodeError, TuitionRequestStatus};

use crate::db::{
    ApplicationRepository, NotificationRepository, RepositoryError, StudentRepository,
    TeacherRepository, TuitionRequestRepository,
};
use crate::models::{
    NewApplication, NewNotification, NewStudent, NewTeacher, Student, Teacher, TuitionRequest,
};

/// Attempts at finding an unused teacher code before giving up.
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// Errors from registration and application flows.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// No teacher has the quoted code.
    #[error("teacher not found")]
    TeacherNotFound,

    /// Teacher exists but has not been approved.
    #[error("teacher is not approved yet")]
    TeacherNotApproved,

    /// No such tuition request.
    #[error("tuition request not found")]
    RequestNotFound,

    /// Request is unapproved, assigned, or closed.
    #[error("tuition request is not open for applications")]
    RequestNotOpen,

    /// Same teacher already applied to this request.
    #[error("teacher has already applied to this tuition request")]
    AlreadyApplied,

    /// Every generated teacher code collided.
    #[error("could not allocate a unique teacher code")]
    CodeExhausted,

    /// Generated code failed validation.
    #[error("invalid teacher code: {0}")]
    Code(#[from] TeacherCodeError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for RegistrationError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Generate a random `TL-XXXXXX` code.
///
/// # Errors
///
/// Returns `TeacherCodeError` only if the alphabet constant is broken.
pub fn generate_teacher_code() -> Result<TeacherCode, TeacherCodeError> {
    let mut rng = rand::rng();
    let suffix: String = (0..TeacherCode::SUFFIX_LEN)
        .filter_map(|_| TeacherCode::ALPHABET.choose(&mut rng))
        .map(|&b| char::from(b))
        .collect();
    TeacherCode::from_suffix(&suffix)
}

/// Service for registration and application writes.
pub struct RegistrationService<'a> {
    pool: &'a PgPool,
}

impl<'a> RegistrationService<'a> {
    /// Create a new registration service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Student, then their tuition request, then a notification.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::Repository` if any write fails; nothing is
    /// committed in that case.
    #[instrument(skip(self, student), fields(district = %student.district))]
    pub async fn register_student(
        &self,
        student: &NewStudent,
    ) -> Result<(Student, TuitionRequest), RegistrationError> {
        let mut tx = self.pool.begin().await?;

        let student = StudentRepository::insert(&mut *tx, student).await?;
        let request = TuitionRequestRepository::insert(&mut *tx, student.id).await?;
        NotificationRepository::insert(
            &mut *tx,
            &NewNotification::student_registered(&student.name, &student.district),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(student_id = %student.id, request_id = %request.id, "Student registered");
        Ok((student, request))
    }

    /// Teacher under a fresh code, then a notification.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::CodeExhausted` after
    /// [`MAX_CODE_ATTEMPTS`] collisions.
    #[instrument(skip(self, teacher))]
    pub async fn register_teacher(&self, teacher: &NewTeacher) -> Result<Teacher, RegistrationError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_teacher_code()?;
            let mut tx = self.pool.begin().await?;

            let created = match TeacherRepository::insert(&mut *tx, &code, teacher).await {
                Ok(created) => created,
                Err(RepositoryError::Conflict(constraint))
                    if constraint == crate::db::teachers::TEACHER_CODE_CONSTRAINT =>
                {
                    tracing::debug!(attempt, code = %code, "Teacher code collision, retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            NotificationRepository::insert(
                &mut *tx,
                &NewNotification::teacher_registered(&created.name, &created.teacher_code),
            )
            .await?;
            tx.commit().await?;

            tracing::info!(teacher_id = %created.id, code = %created.teacher_code, "Teacher registered");
            return Ok(created);
        }

        Err(RegistrationError::CodeExhausted)
    }

    /// A teacher applies to a tuition request by code.
    ///
    /// # Errors
    ///
    /// Returns a `RegistrationError` naming why the application is refused.
    #[instrument(skip(self), fields(code = %application.teacher_code))]
    pub async fn apply(&self, application: &NewApplication) -> Result<ApplicationId, RegistrationError> {
        let teacher = TeacherRepository::new(self.pool)
            .get_by_code(&application.teacher_code)
            .await?
            .ok_or(RegistrationError::TeacherNotFound)?;
        if !teacher.is_approved {
            return Err(RegistrationError::TeacherNotApproved);
        }

        let request = TuitionRequestRepository::new(self.pool)
            .get_by_id(application.tuition_request_id)
            .await?
            .ok_or(RegistrationError::RequestNotFound)?;
        if !request.accepts_applications() {
            return Err(RegistrationError::RequestNotOpen);
        }

        let student_name = StudentRepository::new(self.pool)
            .get_by_id(request.student_id)
            .await?
            .map_or_else(|| format!("request #{}", request.id), |s| s.name);

        let mut tx = self.pool.begin().await?;
        let id = ApplicationRepository::insert(&mut *tx, teacher.id, request.id)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(constraint)
                    if constraint == crate::db::applications::APPLICATION_PAIR_CONSTRAINT =>
                {
                    RegistrationError::AlreadyApplied
                }
                other => other.into(),
            })?;
        NotificationRepository::insert(
            &mut *tx,
            &NewNotification::tuition_application(&teacher.teacher_code, &student_name),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(application_id = %id, "Application received");
        Ok(id)
    }

    /// Set an application's status. Approving also marks its request assigned.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::Repository(NotFound)` for an unknown application.
    #[instrument(skip(self))]
    pub async fn decide_application(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), RegistrationError> {
        let mut tx = self.pool.begin().await?;

        let request_id = ApplicationRepository::set_status(&mut *tx, id, status).await?;
        if status == ApplicationStatus::Approved {
            TuitionRequestRepository::update_with(
                &mut *tx,
                request_id,
                Some(TuitionRequestStatus::Assigned),
                None,
            )
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
