//! Tuition request repository.

use sqlx::{PgExecutor, PgPool};

use tutorlink_core::{StudentId, TuitionRequestId, TuitionRequestStatus};

use super::{RepositoryError, expect_affected};
use crate::models::{TuitionRequest, TuitionRequestDetail};

const COLUMNS: &str = "id, student_id, status, is_approved, created_at, updated_at";

/// Listing query shared by the admin list and the report.
pub(crate) const DETAIL_SELECT: &str = r"
    SELECT r.id, r.student_id, r.status, r.is_approved,
           s.name AS student_name, s.subjects, s.grade, s.province, s.district,
           (SELECT COUNT(*) FROM tutorlink.application a WHERE a.tuition_request_id = r.id)
               AS application_count,
           r.created_at
    FROM tutorlink.tuition_request r
    JOIN tutorlink.student s ON s.id = r.student_id
";

/// Repository for tuition request database operations.
pub struct TuitionRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TuitionRequestRepository<'a> {
    /// Create a new tuition request repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Open a new request for a student: `active` and awaiting approval.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the student does not exist.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        student_id: StudentId,
    ) -> Result<TuitionRequest, RepositoryError> {
        let sql = format!(
            "INSERT INTO tutorlink.tuition_request (student_id) VALUES ($1) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TuitionRequest>(&sql)
            .bind(student_id)
            .fetch_one(executor)
            .await
            .map_err(RepositoryError::from_write)
    }

    /// Get a request by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        id: TuitionRequestId,
    ) -> Result<Option<TuitionRequest>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM tutorlink.tuition_request WHERE id = $1");
        let request = sqlx::query_as::<_, TuitionRequest>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(request)
    }

    /// Get a request with its student details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_detail(
        &self,
        id: TuitionRequestId,
    ) -> Result<Option<TuitionRequestDetail>, RepositoryError> {
        let sql = format!("{DETAIL_SELECT} WHERE r.id = $1");
        let request = sqlx::query_as::<_, TuitionRequestDetail>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(request)
    }

    /// Requests belonging to one student, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<TuitionRequest>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM tutorlink.tuition_request WHERE student_id = $1 ORDER BY created_at DESC"
        );
        let requests = sqlx::query_as::<_, TuitionRequest>(&sql)
            .bind(student_id)
            .fetch_all(self.pool)
            .await?;

        Ok(requests)
    }

    /// List requests with student details, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<TuitionRequestStatus>,
        is_approved: Option<bool>,
    ) -> Result<Vec<TuitionRequestDetail>, RepositoryError> {
        let sql = format!(
            r"{DETAIL_SELECT}
            WHERE ($1::tutorlink.tuition_status IS NULL OR r.status = $1)
              AND ($2::boolean IS NULL OR r.is_approved = $2)
            ORDER BY r.created_at DESC, r.id DESC
            "
        );
        let requests = sqlx::query_as::<_, TuitionRequestDetail>(&sql)
            .bind(status)
            .bind(is_approved)
            .fetch_all(self.pool)
            .await?;

        Ok(requests)
    }

    /// Update status and/or approval, leaving absent fields unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the request does not exist.
    pub async fn update(
        &self,
        id: TuitionRequestId,
        status: Option<TuitionRequestStatus>,
        is_approved: Option<bool>,
    ) -> Result<TuitionRequest, RepositoryError> {
        Self::update_with(self.pool, id, status, is_approved).await
    }

    /// [`Self::update`] on any executor.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the request does not exist.
    pub async fn update_with<'e>(
        executor: impl PgExecutor<'e>,
        id: TuitionRequestId,
        status: Option<TuitionRequestStatus>,
        is_approved: Option<bool>,
    ) -> Result<TuitionRequest, RepositoryError> {
        let sql = format!(
            r"
            UPDATE tutorlink.tuition_request
            SET status = COALESCE($2, status),
                is_approved = COALESCE($3, is_approved),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        );
        sqlx::query_as::<_, TuitionRequest>(&sql)
            .bind(id)
            .bind(status)
            .bind(is_approved)
            .fetch_optional(executor)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a request and its applications.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the request does not exist.
    pub async fn delete(&self, id: TuitionRequestId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tutorlink.tuition_request WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        expect_affected(result.rows_affected())
    }
}
