//! Testimonial repository.

use sqlx::PgPool;

use tutorlink_core::TestimonialId;

use super::{RepositoryError, expect_affected};
use crate::models::{NewTestimonial, Testimonial};

/// Repository for testimonial database operations.
pub struct TestimonialRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TestimonialRepository<'a> {
    /// Create a new testimonial repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Publish a testimonial.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, t: &NewTestimonial) -> Result<Testimonial, RepositoryError> {
        let testimonial = sqlx::query_as::<_, Testimonial>(
            r"
            INSERT INTO tutorlink.testimonial (name, role, message, rating, location)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, role, message, rating, location, created_at
            ",
        )
        .bind(&t.name)
        .bind(t.role)
        .bind(&t.message)
        .bind(t.rating)
        .bind(t.location.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(testimonial)
    }

    /// All testimonials, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Testimonial>, RepositoryError> {
        let testimonials = sqlx::query_as::<_, Testimonial>(
            r"
            SELECT id, name, role, message, rating, location, created_at
            FROM tutorlink.testimonial
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(testimonials)
    }

    /// Get a testimonial by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: TestimonialId) -> Result<Option<Testimonial>, RepositoryError> {
        let testimonial = sqlx::query_as::<_, Testimonial>(
            r"
            SELECT id, name, role, message, rating, location, created_at
            FROM tutorlink.testimonial
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(testimonial)
    }

    /// Replace a testimonial.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the testimonial does not exist.
    pub async fn update(
        &self,
        id: TestimonialId,
        t: &NewTestimonial,
    ) -> Result<Testimonial, RepositoryError> {
        sqlx::query_as::<_, Testimonial>(
            r"
            UPDATE tutorlink.testimonial
            SET name = $2, role = $3, message = $4, rating = $5, location = $6
            WHERE id = $1
            RETURNING id, name, role, message, rating, location, created_at
            ",
        )
        .bind(id)
        .bind(&t.name)
        .bind(t.role)
        .bind(&t.message)
        .bind(t.rating)
        .bind(t.location.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a testimonial.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the testimonial does not exist.
    pub async fn delete(&self, id: TestimonialId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tutorlink.testimonial WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        expect_affected(result.rows_affected())
    }
}
