//! Student repository.

use sqlx::{PgExecutor, PgPool};

use tutorlink_core::StudentId;

use super::{RepositoryError, contains_pattern, expect_affected};
use crate::models::{NewStudent, Student};

pub(crate) const COLUMNS: &str = "id, request_type, name, phone, email, gender, province, district, \
    municipality, address, school_name, grade, subjects, preferred_time_start, \
    preferred_time_end, preferred_teacher_gender, budget, notes, created_at, updated_at";

/// Repository for student database operations.
pub struct StudentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StudentRepository<'a> {
    /// Create a new student repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a student using any executor, so registration can run inside
    /// a transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        student: &NewStudent,
    ) -> Result<Student, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO tutorlink.student (
                request_type, name, phone, email, gender, province, district,
                municipality, address, school_name, grade, subjects,
                preferred_time_start, preferred_time_end, preferred_teacher_gender,
                budget, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {COLUMNS}
            "
        );

        sqlx::query_as::<_, Student>(&sql)
            .bind(student.request_type)
            .bind(&student.name)
            .bind(&student.phone)
            .bind(student.email.as_ref())
            .bind(student.gender)
            .bind(&student.province)
            .bind(&student.district)
            .bind(student.municipality.as_deref())
            .bind(student.address.as_deref())
            .bind(student.school_name.as_deref())
            .bind(student.grade.as_deref())
            .bind(&student.subjects)
            .bind(student.preferred_time_start)
            .bind(student.preferred_time_end)
            .bind(student.preferred_teacher_gender)
            .bind(student.budget)
            .bind(student.notes.as_deref())
            .fetch_one(executor)
            .await
            .map_err(RepositoryError::from_write)
    }

    /// List students, newest first, optionally matching `search` against
    /// name, phone, school or district.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Student>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {COLUMNS}
            FROM tutorlink.student
            WHERE $1::text IS NULL
               OR name ILIKE $1 ESCAPE '\'
               OR phone ILIKE $1 ESCAPE '\'
               OR school_name ILIKE $1 ESCAPE '\'
               OR district ILIKE $1 ESCAPE '\'
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "
        );

        let students = sqlx::query_as::<_, Student>(&sql)
            .bind(search.map(contains_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        Ok(students)
    }

    /// Get a student by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: StudentId) -> Result<Option<Student>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM tutorlink.student WHERE id = $1");
        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(student)
    }

    /// Overwrite a student's details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the student does not exist.
    pub async fn update(
        &self,
        id: StudentId,
        student: &NewStudent,
    ) -> Result<Student, RepositoryError> {
        let sql = format!(
            r"
            UPDATE tutorlink.student SET
                request_type = $2, name = $3, phone = $4, email = $5, gender = $6,
                province = $7, district = $8, municipality = $9, address = $10,
                school_name = $11, grade = $12, subjects = $13,
                preferred_time_start = $14, preferred_time_end = $15,
                preferred_teacher_gender = $16, budget = $17, notes = $18,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        );

        sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .bind(student.request_type)
            .bind(&student.name)
            .bind(&student.phone)
            .bind(student.email.as_ref())
            .bind(student.gender)
            .bind(&student.province)
            .bind(&student.district)
            .bind(student.municipality.as_deref())
            .bind(student.address.as_deref())
            .bind(student.school_name.as_deref())
            .bind(student.grade.as_deref())
            .bind(&student.subjects)
            .bind(student.preferred_time_start)
            .bind(student.preferred_time_end)
            .bind(student.preferred_teacher_gender)
            .bind(student.budget)
            .bind(student.notes.as_deref())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a student. Their tuition requests and applications cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the student does not exist.
    pub async fn delete(&self, id: StudentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tutorlink.student WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        expect_affected(result.rows_affected())
    }
}
