//! Notice repository.

use sqlx::PgPool;

use tutorlink_core::NoticeId;

use super::{RepositoryError, expect_affected};
use crate::models::{NewNotice, Notice};

/// Repository for notice database operations.
pub struct NoticeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NoticeRepository<'a> {
    /// Create a new notice repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Publish a notice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, notice: &NewNotice) -> Result<Notice, RepositoryError> {
        let notice = sqlx::query_as::<_, Notice>(
            r"
            INSERT INTO tutorlink.notice (text, photo_urls)
            VALUES ($1, $2)
            RETURNING id, text, photo_urls, created_at
            ",
        )
        .bind(&notice.text)
        .bind(&notice.photo_urls)
        .fetch_one(self.pool)
        .await?;

        Ok(notice)
    }

    /// All notices, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Notice>, RepositoryError> {
        let notices = sqlx::query_as::<_, Notice>(
            r"
            SELECT id, text, photo_urls, created_at
            FROM tutorlink.notice
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(notices)
    }

    /// Replace a notice's text and photos.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notice does not exist.
    pub async fn update(&self, id: NoticeId, notice: &NewNotice) -> Result<Notice, RepositoryError> {
        sqlx::query_as::<_, Notice>(
            r"
            UPDATE tutorlink.notice
            SET text = $2, photo_urls = $3
            WHERE id = $1
            RETURNING id, text, photo_urls, created_at
            ",
        )
        .bind(id)
        .bind(&notice.text)
        .bind(&notice.photo_urls)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a notice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notice does not exist.
    pub async fn delete(&self, id: NoticeId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tutorlink.notice WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        expect_affected(result.rows_affected())
    }
}
