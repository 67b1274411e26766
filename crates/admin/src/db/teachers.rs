//! Teacher repository.
//!
//! `teacher_code` is written only by [`TeacherRepository::insert`]; no
//! update statement here touches the column.

use sqlx::{PgExecutor, PgPool};

use tutorlink_core::{TeacherCode, TeacherId};

use super::{RepositoryError, contains_pattern, expect_affected};
use crate::models::{NewTeacher, Teacher, TeacherStanding};

pub(crate) const COLUMNS: &str = "id, teacher_code, name, phone, email, gender, province, district, \
    address, qualification, experience_years, subjects, cv_url, photo_url, is_approved, \
    level, priority, left_payment, created_at, updated_at";

/// Name of the unique constraint on `teacher_code`.
pub const TEACHER_CODE_CONSTRAINT: &str = "teacher_teacher_code_key";

/// Repository for teacher database operations.
pub struct TeacherRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TeacherRepository<'a> {
    /// Create a new teacher repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a teacher under the given code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` carrying [`TEACHER_CODE_CONSTRAINT`]
    /// if the code is already taken.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        code: &TeacherCode,
        teacher: &NewTeacher,
    ) -> Result<Teacher, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO tutorlink.teacher (
                teacher_code, name, phone, email, gender, province, district, address,
                qualification, experience_years, subjects, cv_url, photo_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {COLUMNS}
            "
        );

        sqlx::query_as::<_, Teacher>(&sql)
            .bind(code)
            .bind(&teacher.name)
            .bind(&teacher.phone)
            .bind(teacher.email.as_ref())
            .bind(teacher.gender)
            .bind(&teacher.province)
            .bind(&teacher.district)
            .bind(teacher.address.as_deref())
            .bind(&teacher.qualification)
            .bind(teacher.experience_years)
            .bind(&teacher.subjects)
            .bind(teacher.cv_url.as_deref())
            .bind(teacher.photo_url.as_deref())
            .fetch_one(executor)
            .await
            .map_err(RepositoryError::from_write)
    }

    /// List teachers, highest priority first, then newest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        is_approved: Option<bool>,
        search: Option<&str>,
    ) -> Result<Vec<Teacher>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {COLUMNS}
            FROM tutorlink.teacher
            WHERE ($1::boolean IS NULL OR is_approved = $1)
              AND ($2::text IS NULL
                   OR name ILIKE $2 ESCAPE '\'
                   OR phone ILIKE $2 ESCAPE '\'
                   OR teacher_code ILIKE $2 ESCAPE '\')
            ORDER BY priority DESC, created_at DESC, id DESC
            "
        );
        let teachers = sqlx::query_as::<_, Teacher>(&sql)
            .bind(is_approved)
            .bind(search.map(contains_pattern))
            .fetch_all(self.pool)
            .await?;

        Ok(teachers)
    }

    /// Approved teachers that have an email address on file.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_approved_with_email(&self) -> Result<Vec<Teacher>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {COLUMNS}
            FROM tutorlink.teacher
            WHERE is_approved AND email IS NOT NULL
            ORDER BY priority DESC, id
            "
        );
        let teachers = sqlx::query_as::<_, Teacher>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(teachers)
    }

    /// Get a teacher by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: TeacherId) -> Result<Option<Teacher>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM tutorlink.teacher WHERE id = $1");
        let teacher = sqlx::query_as::<_, Teacher>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(teacher)
    }

    /// Get a teacher by public code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &TeacherCode) -> Result<Option<Teacher>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM tutorlink.teacher WHERE teacher_code = $1");
        let teacher = sqlx::query_as::<_, Teacher>(&sql)
            .bind(code)
            .fetch_optional(self.pool)
            .await?;

        Ok(teacher)
    }

    /// Overwrite a teacher's profile. The code and admin fields are untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the teacher does not exist.
    pub async fn update_profile(
        &self,
        id: TeacherId,
        teacher: &NewTeacher,
    ) -> Result<Teacher, RepositoryError> {
        let sql = format!(
            r"
            UPDATE tutorlink.teacher SET
                name = $2, phone = $3, email = $4, gender = $5, province = $6,
                district = $7, address = $8, qualification = $9, experience_years = $10,
                subjects = $11, cv_url = $12, photo_url = $13, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        );

        sqlx::query_as::<_, Teacher>(&sql)
            .bind(id)
            .bind(&teacher.name)
            .bind(&teacher.phone)
            .bind(teacher.email.as_ref())
            .bind(teacher.gender)
            .bind(&teacher.province)
            .bind(&teacher.district)
            .bind(teacher.address.as_deref())
            .bind(&teacher.qualification)
            .bind(teacher.experience_years)
            .bind(&teacher.subjects)
            .bind(teacher.cv_url.as_deref())
            .bind(teacher.photo_url.as_deref())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Set the approval flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the teacher does not exist.
    pub async fn set_approved(
        &self,
        id: TeacherId,
        is_approved: bool,
    ) -> Result<Teacher, RepositoryError> {
        let sql = format!(
            r"
            UPDATE tutorlink.teacher
            SET is_approved = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        );
        sqlx::query_as::<_, Teacher>(&sql)
            .bind(id)
            .bind(is_approved)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Set level, priority and outstanding payment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the teacher does not exist.
    pub async fn set_standing(
        &self,
        id: TeacherId,
        standing: &TeacherStanding,
    ) -> Result<Teacher, RepositoryError> {
        let sql = format!(
            r"
            UPDATE tutorlink.teacher
            SET level = $2, priority = $3, left_payment = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        );
        sqlx::query_as::<_, Teacher>(&sql)
            .bind(id)
            .bind(standing.level.as_deref())
            .bind(standing.priority)
            .bind(standing.left_payment)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a teacher and their applications.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the teacher does not exist.
    pub async fn delete(&self, id: TeacherId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tutorlink.teacher WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        expect_affected(result.rows_affected())
    }
}
