//! Teacher applications for tuition requests.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tutorlink_core::{ApplicationId, ApplicationStatus, TuitionRequestId};

use crate::db::ApplicationRepository;
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::middleware::RequireAdmin;
use crate::models::{ApplicationDecision, ApplicationDetail, ApplicationInput};
use crate::services::RegistrationService;
use crate::state::AppState;

use super::{ApiMessage, ApiSuccess, done, ok};

/// Build the applications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/applications", post(apply))
        .route("/api/admin/applications", get(index))
        .route(
            "/api/admin/applications/{id}",
            get(show).patch(decide).delete(destroy),
        )
}

/// Id of a newly created application.
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: ApplicationId,
}

/// A teacher applies using their teacher code.
///
/// POST /api/applications
#[instrument(skip(state))]
async fn apply(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ApplicationInput>,
) -> Result<Json<ApiSuccess<Created>>, AppError> {
    let application = input.validate()?;

    let id = RegistrationService::new(state.pool())
        .apply(&application)
        .await?;

    Ok(ok(Created { id }))
}

/// Application list filters.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplicationQuery {
    pub status: Option<ApplicationStatus>,
    pub tuition_request_id: Option<TuitionRequestId>,
}

/// GET /api/admin/applications
#[instrument(skip(_admin, state))]
async fn index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ApplicationQuery>,
) -> Result<Json<ApiSuccess<Vec<ApplicationDetail>>>, AppError> {
    let applications = ApplicationRepository::new(state.pool())
        .list(query.status, query.tuition_request_id)
        .await?;

    Ok(ok(applications))
}

/// GET /api/admin/applications/{id}
async fn show(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
) -> Result<Json<ApiSuccess<ApplicationDetail>>, AppError> {
    let application = ApplicationRepository::new(state.pool())
        .get_detail(id)
        .await?
        .ok_or(AppError::NotFound("Application"))?;

    Ok(ok(application))
}

/// Set the status; approving also marks the tuition request `assigned`.
///
/// PATCH /api/admin/applications/{id}
#[instrument(skip(admin, state))]
async fn decide(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
    JsonBody(decision): JsonBody<ApplicationDecision>,
) -> Result<Json<ApiSuccess<ApplicationDetail>>, AppError> {
    RegistrationService::new(state.pool())
        .decide_application(id, decision.status)
        .await?;
    tracing::info!(
        application_id = %id,
        status = %decision.status,
        admin_id = %admin.id,
        "Application decided"
    );

    let application = ApplicationRepository::new(state.pool())
        .get_detail(id)
        .await?
        .ok_or(AppError::NotFound("Application"))?;

    Ok(ok(application))
}

/// DELETE /api/admin/applications/{id}
#[instrument(skip(_admin, state))]
async fn destroy(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
) -> Result<Json<ApiMessage>, AppError> {
    ApplicationRepository::new(state.pool()).delete(id).await?;
    Ok(done("Application deleted"))
}
