//! Notification repository.

use sqlx::{PgExecutor, PgPool};

use tutorlink_core::NotificationId;

use super::{RepositoryError, expect_affected};
use crate::models::{NewNotification, Notification};

const COLUMNS: &str = "id, title, message, type, is_read, created_at";

/// Repository for notification database operations.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a notification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        notification: &NewNotification,
    ) -> Result<Notification, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO tutorlink.notification (title, message, type)
            VALUES ($1, $2, $3)
            RETURNING {COLUMNS}
            "
        );
        let notification = sqlx::query_as::<_, Notification>(&sql)
            .bind(&notification.title)
            .bind(&notification.message)
            .bind(notification.kind)
            .fetch_one(executor)
            .await?;

        Ok(notification)
    }

    /// List notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {COLUMNS}
            FROM tutorlink.notification
            WHERE NOT ($1 AND is_read)
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "
        );
        let notifications = sqlx::query_as::<_, Notification>(&sql)
            .bind(unread_only)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(notifications)
    }

    /// Number of unread notifications.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unread_count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tutorlink.notification WHERE NOT is_read",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Mark one notification read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notification does not exist.
    pub async fn mark_read(&self, id: NotificationId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE tutorlink.notification SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        expect_affected(result.rows_affected())
    }

    /// Mark every unread notification read, returning how many changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_all_read(&self) -> Result<u64, RepositoryError> {
        let result =
            sqlx::query("UPDATE tutorlink.notification SET is_read = TRUE WHERE NOT is_read")
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Delete one notification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notification does not exist.
    pub async fn delete(&self, id: NotificationId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tutorlink.notification WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        expect_affected(result.rows_affected())
    }

    /// Delete every read notification, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_read(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM tutorlink.notification WHERE is_read")
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
