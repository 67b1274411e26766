//! Public notices and their admin CRUD.
//!
//! Which notices a visitor has already seen lives only in the browser: the
//! `shown-notices` cookie holds comma-separated notice ids. Each call to
//! `/api/notices/active` rewrites it to the ids of the notices that still
//! exist, so deleted notices drop out of it.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, header},
    response::{AppendHeaders, IntoResponse},
    routing::{get, put},
};
use tower_sessions::cookie::{Cookie, SameSite};
use tracing::instrument;

use tutorlink_core::NoticeId;

use crate::db::NoticeRepository;
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::middleware::RequireAdmin;
use crate::models::{Notice, NoticeInput};
use crate::state::AppState;

use super::{ApiMessage, ApiSuccess, done, ok};

/// Browser-side record of notices already shown.
pub const SHOWN_COOKIE: &str = "shown-notices";

/// Build the notices router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notices/active", get(active))
        .route("/api/admin/notices", get(index).post(create))
        .route("/api/admin/notices/{id}", put(update).delete(destroy))
}

/// Notice ids listed in the request's `shown-notices` cookie.
///
/// Unparseable entries are skipped.
#[must_use]
pub fn shown_ids(headers: &HeaderMap) -> Vec<NoticeId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .filter(|cookie| cookie.name() == SHOWN_COOKIE)
        .flat_map(|cookie| {
            cookie
                .value()
                .split(',')
                .filter_map(|id| id.trim().parse::<i32>().ok())
                .map(NoticeId::new)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// `Set-Cookie` value recording every notice in `live` as shown.
///
/// A session cookie, so the record resets with the browser session.
#[must_use]
pub fn shown_cookie(live: &[Notice]) -> String {
    let value = live
        .iter()
        .map(|notice| notice.id.to_string())
        .collect::<Vec<_>>()
        .join(",");

    Cookie::build((SHOWN_COOKIE, value))
        .path("/")
        .same_site(SameSite::Lax)
        .build()
        .to_string()
}

/// The `live` notices missing from `seen`, plus the cookie to set when the
/// record changes.
///
/// The record changes when something new is shown or when `seen` names a
/// notice that no longer exists.
#[must_use]
pub fn next_batch(seen: &[NoticeId], live: Vec<Notice>) -> (Vec<Notice>, Option<String>) {
    let stale = seen
        .iter()
        .any(|id| !live.iter().any(|notice| notice.id == *id));
    let cookie = shown_cookie(&live);

    let unseen: Vec<Notice> = live
        .into_iter()
        .filter(|notice| !seen.contains(&notice.id))
        .collect();

    let cookie = (stale || !unseen.is_empty()).then_some(cookie);
    (unseen, cookie)
}

/// Notices this browser has not seen yet.
///
/// GET /api/notices/active
async fn active(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let seen = shown_ids(&headers);

    let live = NoticeRepository::new(state.pool()).list().await?;

    let (notices, cookie) = next_batch(&seen, live);
    let cookie = cookie.map(|value| (header::SET_COOKIE, value));

    Ok((AppendHeaders(cookie), ok(notices)))
}

/// GET /api/admin/notices
async fn index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ApiSuccess<Vec<Notice>>>, AppError> {
    let notices = NoticeRepository::new(state.pool()).list().await?;
    Ok(ok(notices))
}

/// POST /api/admin/notices
#[instrument(skip(_admin, state, input))]
async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NoticeInput>,
) -> Result<Json<ApiSuccess<Notice>>, AppError> {
    let notice = input.validate()?;
    let notice = NoticeRepository::new(state.pool()).create(&notice).await?;
    Ok(ok(notice))
}

/// PUT /api/admin/notices/{id}
#[instrument(skip(_admin, state, input))]
async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<NoticeId>,
    JsonBody(input): JsonBody<NoticeInput>,
) -> Result<Json<ApiSuccess<Notice>>, AppError> {
    let notice = input.validate()?;
    let notice = NoticeRepository::new(state.pool())
        .update(id, &notice)
        .await?;
    Ok(ok(notice))
}

/// DELETE /api/admin/notices/{id}
async fn destroy(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<NoticeId>,
) -> Result<Json<ApiMessage>, AppError> {
    NoticeRepository::new(state.pool()).delete(id).await?;
    Ok(done("Notice deleted"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;
    use chrono::Utc;

    use super::*;

    fn notice(id: i32) -> Notice {
        Notice {
            id: NoticeId::new(id),
            text: "Admissions open".to_string(),
            photo_urls: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn headers(cookie: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static(cookie));
        headers
    }

    #[test]
    fn test_shown_ids_from_cookie() {
        let ids = shown_ids(&headers("admin-session=abc; shown-notices=3,7,x,12"));
        assert_eq!(ids, vec![NoticeId::new(3), NoticeId::new(7), NoticeId::new(12)]);
    }

    #[test]
    fn test_shown_ids_without_cookie() {
        assert!(shown_ids(&HeaderMap::new()).is_empty());
        assert!(shown_ids(&headers("admin-session=abc")).is_empty());
    }

    #[test]
    fn test_shown_cookie_lists_live_ids() {
        let cookie = shown_cookie(&[notice(5), notice(3)]);
        assert!(cookie.starts_with("shown-notices=5,3;"));
        assert!(cookie.contains("Path=/"));
        assert!(!cookie.contains("Max-Age"));
    }

    #[test]
    fn test_next_batch_shows_only_new_notices() {
        let (unseen, cookie) = next_batch(&[NoticeId::new(3)], vec![notice(5), notice(3)]);
        assert_eq!(unseen.len(), 1);
        assert_eq!(unseen[0].id, NoticeId::new(5));
        assert!(cookie.unwrap().starts_with("shown-notices=5,3;"));
    }

    #[test]
    fn test_next_batch_leaves_unchanged_record_alone() {
        let seen = [NoticeId::new(5), NoticeId::new(3)];
        let (unseen, cookie) = next_batch(&seen, vec![notice(5), notice(3)]);
        assert!(unseen.is_empty());
        assert!(cookie.is_none());
    }

    #[test]
    fn test_next_batch_drops_deleted_ids() {
        // 9 and 12 were deleted since they were shown.
        let seen = [NoticeId::new(9), NoticeId::new(3), NoticeId::new(12)];
        let (unseen, cookie) = next_batch(&seen, vec![notice(3)]);
        assert!(unseen.is_empty());
        assert!(cookie.unwrap().starts_with("shown-notices=3;"));

        let (_, cookie) = next_batch(&seen, Vec::new());
        assert!(cookie.unwrap().starts_with("shown-notices=;"));
    }
}
