//! Tuition request moderation.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use tutorlink_core::{TuitionRequestId, TuitionRequestStatus};

use crate::db::TuitionRequestRepository;
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::middleware::RequireAdmin;
use crate::models::{TuitionRequest, TuitionRequestDetail, TuitionRequestUpdate};
use crate::state::AppState;

use super::{ApiMessage, ApiSuccess, done, ok};

/// Build the tuition requests router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/tuition-requests", get(index))
        .route(
            "/api/admin/tuition-requests/{id}",
            get(show).patch(update).delete(destroy),
        )
        .route("/api/admin/tuition-requests/{id}/approve", post(approve))
}

/// Tuition request list filters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TuitionRequestQuery {
    pub status: Option<TuitionRequestStatus>,
    pub approved: Option<bool>,
}

/// GET /api/admin/tuition-requests
#[instrument(skip(_admin, state))]
async fn index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<TuitionRequestQuery>,
) -> Result<Json<ApiSuccess<Vec<TuitionRequestDetail>>>, AppError> {
    let requests = TuitionRequestRepository::new(state.pool())
        .list(query.status, query.approved)
        .await?;

    Ok(ok(requests))
}

/// GET /api/admin/tuition-requests/{id}
async fn show(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TuitionRequestId>,
) -> Result<Json<ApiSuccess<TuitionRequestDetail>>, AppError> {
    let request = TuitionRequestRepository::new(state.pool())
        .get_detail(id)
        .await?
        .ok_or(AppError::NotFound("Tuition request"))?;

    Ok(ok(request))
}

/// Change status and/or approval; absent fields are left as they are.
///
/// PATCH /api/admin/tuition-requests/{id}
#[instrument(skip(_admin, state))]
async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TuitionRequestId>,
    JsonBody(update): JsonBody<TuitionRequestUpdate>,
) -> Result<Json<ApiSuccess<TuitionRequest>>, AppError> {
    if update.status.is_none() && update.is_approved.is_none() {
        return Err(AppError::invalid("status", "nothing to update"));
    }

    let request = TuitionRequestRepository::new(state.pool())
        .update(id, update.status, update.is_approved)
        .await?;

    Ok(ok(request))
}

/// POST /api/admin/tuition-requests/{id}/approve
#[instrument(skip(admin, state))]
async fn approve(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TuitionRequestId>,
) -> Result<Json<ApiSuccess<TuitionRequest>>, AppError> {
    let request = TuitionRequestRepository::new(state.pool())
        .update(id, None, Some(true))
        .await?;
    tracing::info!(tuition_request_id = %id, admin_id = %admin.id, "Tuition request approved");

    Ok(ok(request))
}

/// DELETE /api/admin/tuition-requests/{id}
#[instrument(skip(_admin, state))]
async fn destroy(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TuitionRequestId>,
) -> Result<Json<ApiMessage>, AppError> {
    TuitionRequestRepository::new(state.pool()).delete(id).await?;
    Ok(done("Tuition request deleted"))
}
