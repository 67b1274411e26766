//! Teacher registration, approval and admin management.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tutorlink_core::TeacherId;

use crate::db::TeacherRepository;
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::middleware::RequireAdmin;
use crate::models::{Teacher, TeacherAdminUpdate, TeacherInput};
use crate::services::{EmailError, RegistrationService};
use crate::state::AppState;

use super::{ApiMessage, ApiSuccess, done, ok};

/// Build the teachers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/teachers", post(register))
        .route("/api/admin/teachers", get(index))
        .route(
            "/api/admin/teachers/{id}",
            get(show).put(update).delete(destroy),
        )
        .route("/api/admin/teachers/{id}/approve", post(approve))
        .route("/api/admin/teachers/{id}/reject", post(reject))
        .route("/api/admin/teachers/{id}/standing", put(set_standing))
}

/// Public registration; the response carries the generated `teacherCode`.
///
/// POST /api/teachers
#[instrument(skip(state, input))]
async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<TeacherInput>,
) -> Result<Json<ApiSuccess<Teacher>>, AppError> {
    let teacher = input.validate()?;

    let teacher = RegistrationService::new(state.pool())
        .register_teacher(&teacher)
        .await?;

    Ok(ok(teacher))
}

/// Teacher list filters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TeacherQuery {
    pub approved: Option<bool>,
    /// Matches name, phone or teacher code.
    pub search: Option<String>,
}

/// GET /api/admin/teachers
#[instrument(skip(_admin, state))]
async fn index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<TeacherQuery>,
) -> Result<Json<ApiSuccess<Vec<Teacher>>>, AppError> {
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let teachers = TeacherRepository::new(state.pool())
        .list(query.approved, search)
        .await?;

    Ok(ok(teachers))
}

/// GET /api/admin/teachers/{id}
async fn show(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TeacherId>,
) -> Result<Json<ApiSuccess<Teacher>>, AppError> {
    let teacher = TeacherRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Teacher"))?;

    Ok(ok(teacher))
}

/// Update the profile. The teacher code cannot be changed.
///
/// PUT /api/admin/teachers/{id}
#[instrument(skip(_admin, state, input))]
async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TeacherId>,
    JsonBody(input): JsonBody<TeacherInput>,
) -> Result<Json<ApiSuccess<Teacher>>, AppError> {
    let teacher = input.validate()?;

    let updated = TeacherRepository::new(state.pool())
        .update_profile(id, &teacher)
        .await?;

    Ok(ok(updated))
}

/// Outcome of approving or rejecting a teacher.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDecision {
    pub teacher: Teacher,
    /// `false` when the teacher has no email or the provider failed.
    pub email_sent: bool,
}

/// Log a failed notification email; the decision itself stands.
fn email_delivered(teacher_id: TeacherId, result: Option<Result<(), EmailError>>) -> bool {
    match result {
        Some(Ok(())) => true,
        Some(Err(e)) => {
            tracing::error!(teacher_id = %teacher_id, error = %e, "Teacher decision email failed");
            false
        }
        None => false,
    }
}

/// Approve a teacher and email them their code.
///
/// POST /api/admin/teachers/{id}/approve
#[instrument(skip(admin, state))]
async fn approve(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TeacherId>,
) -> Result<Json<ApiSuccess<TeacherDecision>>, AppError> {
    let teacher = TeacherRepository::new(state.pool())
        .set_approved(id, true)
        .await?;
    tracing::info!(teacher_id = %id, admin_id = %admin.id, "Teacher approved");

    let result = match &teacher.email {
        Some(email) => Some(
            state
                .email()
                .send_approval(email.as_str(), &teacher.name, &teacher.teacher_code)
                .await,
        ),
        None => None,
    };
    let email_sent = email_delivered(id, result);

    Ok(ok(TeacherDecision {
        teacher,
        email_sent,
    }))
}

/// Rejection request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

/// Reject a teacher. The row stays, unapproved.
///
/// POST /api/admin/teachers/{id}/reject
#[instrument(skip(admin, state, body))]
async fn reject(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TeacherId>,
    body: Option<JsonBody<RejectRequest>>,
) -> Result<Json<ApiSuccess<TeacherDecision>>, AppError> {
    let reason = body
        .and_then(|JsonBody(body)| body.reason)
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    let teacher = TeacherRepository::new(state.pool())
        .set_approved(id, false)
        .await?;
    tracing::info!(teacher_id = %id, admin_id = %admin.id, "Teacher rejected");

    let result = match &teacher.email {
        Some(email) => Some(
            state
                .email()
                .send_rejection(email.as_str(), &teacher.name, reason.as_deref())
                .await,
        ),
        None => None,
    };
    let email_sent = email_delivered(id, result);

    Ok(ok(TeacherDecision {
        teacher,
        email_sent,
    }))
}

/// Set level, priority and outstanding payment.
///
/// PUT /api/admin/teachers/{id}/standing
#[instrument(skip(_admin, state, input))]
async fn set_standing(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TeacherId>,
    JsonBody(input): JsonBody<TeacherAdminUpdate>,
) -> Result<Json<ApiSuccess<Teacher>>, AppError> {
    let standing = input.validate()?;

    let teacher = TeacherRepository::new(state.pool())
        .set_standing(id, &standing)
        .await?;

    Ok(ok(teacher))
}

/// DELETE /api/admin/teachers/{id}
#[instrument(skip(admin, state))]
async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TeacherId>,
) -> Result<Json<ApiMessage>, AppError> {
    TeacherRepository::new(state.pool()).delete(id).await?;
    tracing::info!(teacher_id = %id, admin_id = %admin.id, "Teacher deleted");
    Ok(done("Teacher deleted"))
}
