//! Student registration and admin management.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tutorlink_core::StudentId;

use crate::db::{StudentRepository, TuitionRequestRepository};
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::middleware::RequireAdmin;
use crate::models::{Student, StudentInput, TuitionRequest};
use crate::services::RegistrationService;
use crate::state::AppState;

use super::{ApiMessage, ApiSuccess, Page, done, ok};

/// Build the students router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/students", post(register))
        .route("/api/admin/students", get(index))
        .route(
            "/api/admin/students/{id}",
            get(show).put(update).delete(destroy),
        )
}

/// A student together with its tuition requests.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentWithRequests {
    pub student: Student,
    pub tuition_requests: Vec<TuitionRequest>,
}

/// Public registration.
///
/// POST /api/students
///
/// Creates the student, its first tuition request and a
/// `student_registration` notification together.
#[instrument(skip(state, input))]
async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<StudentInput>,
) -> Result<Json<ApiSuccess<StudentWithRequests>>, AppError> {
    let student = input.validate()?;

    let (student, request) = RegistrationService::new(state.pool())
        .register_student(&student)
        .await?;

    Ok(ok(StudentWithRequests {
        student,
        tuition_requests: vec![request],
    }))
}

/// Student list filters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StudentQuery {
    /// Matches name or phone.
    pub search: Option<String>,
}

/// GET /api/admin/students
#[instrument(skip(_admin, state))]
async fn index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<StudentQuery>,
    Query(page): Query<Page>,
) -> Result<Json<ApiSuccess<Vec<Student>>>, AppError> {
    let (limit, offset) = page.limit_offset();
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let students = StudentRepository::new(state.pool())
        .list(search, limit, offset)
        .await?;

    Ok(ok(students))
}

/// GET /api/admin/students/{id}
async fn show(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> Result<Json<ApiSuccess<StudentWithRequests>>, AppError> {
    let student = StudentRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Student"))?;

    let tuition_requests = TuitionRequestRepository::new(state.pool())
        .list_for_student(id)
        .await?;

    Ok(ok(StudentWithRequests {
        student,
        tuition_requests,
    }))
}

/// PUT /api/admin/students/{id}
#[instrument(skip(_admin, state, input))]
async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
    JsonBody(input): JsonBody<StudentInput>,
) -> Result<Json<ApiSuccess<Student>>, AppError> {
    let student = input.validate()?;

    let updated = StudentRepository::new(state.pool())
        .update(id, &student)
        .await?;

    Ok(ok(updated))
}

/// Delete a student along with its tuition requests and their applications.
///
/// DELETE /api/admin/students/{id}
#[instrument(skip(admin, state))]
async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> Result<Json<ApiMessage>, AppError> {
    StudentRepository::new(state.pool()).delete(id).await?;
    tracing::info!(student_id = %id, admin_id = %admin.id, "Student deleted");
    Ok(done("Student deleted"))
}
