//! Application repository.

use sqlx::{PgExecutor, PgPool};

use tutorlink_core::{ApplicationId, ApplicationStatus, TeacherId, TuitionRequestId};

use super::RepositoryError;
use crate::models::ApplicationDetail;

/// Listing query shared by the admin list and the report.
pub(crate) const DETAIL_SELECT: &str = r"
    SELECT a.id, a.teacher_id, a.tuition_request_id, a.status, a.applied_at,
           t.teacher_code, t.name AS teacher_name, t.phone AS teacher_phone,
           s.name AS student_name, s.subjects, s.district
    FROM tutorlink.application a
    JOIN tutorlink.teacher t ON t.id = a.teacher_id
    JOIN tutorlink.tuition_request r ON r.id = a.tuition_request_id
    JOIN tutorlink.student s ON s.id = r.student_id
";

/// Name of the unique constraint on `(teacher_id, tuition_request_id)`.
pub const APPLICATION_PAIR_CONSTRAINT: &str = "application_teacher_id_tuition_request_id_key";

/// Repository for application database operations.
pub struct ApplicationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ApplicationRepository<'a> {
    /// Create a new application repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a pending application.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if this teacher already applied
    /// to this request.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        teacher_id: TeacherId,
        tuition_request_id: TuitionRequestId,
    ) -> Result<ApplicationId, RepositoryError> {
        sqlx::query_scalar::<_, ApplicationId>(
            r"
            INSERT INTO tutorlink.application (teacher_id, tuition_request_id)
            VALUES ($1, $2)
            RETURNING id
            ",
        )
        .bind(teacher_id)
        .bind(tuition_request_id)
        .fetch_one(executor)
        .await
        .map_err(RepositoryError::from_write)
    }

    /// Get one application with its teacher and student.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_detail(
        &self,
        id: ApplicationId,
    ) -> Result<Option<ApplicationDetail>, RepositoryError> {
        let sql = format!("{DETAIL_SELECT} WHERE a.id = $1");
        let application = sqlx::query_as::<_, ApplicationDetail>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(application)
    }

    /// List applications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<ApplicationStatus>,
        tuition_request_id: Option<TuitionRequestId>,
    ) -> Result<Vec<ApplicationDetail>, RepositoryError> {
        let sql = format!(
            r"{DETAIL_SELECT}
            WHERE ($1::tutorlink.application_status IS NULL OR a.status = $1)
              AND ($2::integer IS NULL OR a.tuition_request_id = $2)
            ORDER BY a.applied_at DESC, a.id DESC
            "
        );
        let applications = sqlx::query_as::<_, ApplicationDetail>(&sql)
            .bind(status)
            .bind(tuition_request_id)
            .fetch_all(self.pool)
            .await?;

        Ok(applications)
    }

    /// Set an application's status, returning the request it belongs to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the application does not exist.
    pub async fn set_status<'e>(
        executor: impl PgExecutor<'e>,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<TuitionRequestId, RepositoryError> {
        sqlx::query_scalar::<_, TuitionRequestId>(
            r"
            UPDATE tutorlink.application
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING tuition_request_id
            ",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete an application.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the application does not exist.
    pub async fn delete(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tutorlink.application WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        super::expect_affected(result.rows_affected())
    }
}
