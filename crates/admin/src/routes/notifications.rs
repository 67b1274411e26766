//! Back-office notification feed.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use tutorlink_core::NotificationId;

use crate::db::NotificationRepository;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::Notification;
use crate::state::AppState;

use super::{ApiMessage, ApiSuccess, done, ok};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

/// Build the notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/notifications", get(index))
        .route("/api/admin/notifications/unread-count", get(unread_count))
        .route("/api/admin/notifications/read-all", post(mark_all_read))
        .route("/api/admin/notifications/read", delete(delete_read))
        .route("/api/admin/notifications/{id}", delete(destroy))
        .route("/api/admin/notifications/{id}/read", post(mark_read))
}

/// Notification list filters.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationQuery {
    pub unread_only: bool,
    pub limit: Option<i64>,
}

/// Newest first.
///
/// GET /api/admin/notifications
async fn index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<ApiSuccess<Vec<Notification>>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let notifications = NotificationRepository::new(state.pool())
        .list(query.unread_only, limit)
        .await?;

    Ok(ok(notifications))
}

/// Unread badge count.
#[derive(Debug, Serialize)]
pub struct Count {
    pub count: i64,
}

/// GET /api/admin/notifications/unread-count
async fn unread_count(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ApiSuccess<Count>>, AppError> {
    let count = NotificationRepository::new(state.pool())
        .unread_count()
        .await?;

    Ok(ok(Count { count }))
}

/// POST /api/admin/notifications/{id}/read
async fn mark_read(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<NotificationId>,
) -> Result<Json<ApiMessage>, AppError> {
    NotificationRepository::new(state.pool()).mark_read(id).await?;
    Ok(done("Notification marked as read"))
}

/// Rows touched by a bulk operation.
#[derive(Debug, Serialize)]
pub struct Affected {
    pub affected: u64,
}

/// POST /api/admin/notifications/read-all
async fn mark_all_read(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ApiSuccess<Affected>>, AppError> {
    let affected = NotificationRepository::new(state.pool())
        .mark_all_read()
        .await?;

    Ok(ok(Affected { affected }))
}

/// Deleting a notification never touches the records it describes.
///
/// DELETE /api/admin/notifications/{id}
async fn destroy(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<NotificationId>,
) -> Result<Json<ApiMessage>, AppError> {
    NotificationRepository::new(state.pool()).delete(id).await?;
    Ok(done("Notification deleted"))
}

/// DELETE /api/admin/notifications/read
async fn delete_read(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ApiSuccess<Affected>>, AppError> {
    let affected = NotificationRepository::new(state.pool())
        .delete_read()
        .await?;

    Ok(ok(Affected { affected }))
}
