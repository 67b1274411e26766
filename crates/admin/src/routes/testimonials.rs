//! Testimonials: public listing and admin management.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use tracing::instrument;

use tutorlink_core::TestimonialId;

use crate::db::TestimonialRepository;
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::middleware::RequireAdmin;
use crate::models::{Testimonial, TestimonialInput};
use crate::state::AppState;

use super::{ApiMessage, ApiSuccess, done, ok};

/// Build the testimonials router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/testimonials", get(public_index))
        .route("/api/admin/testimonials", get(index).post(create))
        .route(
            "/api/admin/testimonials/{id}",
            get(show).put(update).delete(destroy),
        )
}

async fn list(state: &AppState) -> Result<Json<ApiSuccess<Vec<Testimonial>>>, AppError> {
    let testimonials = TestimonialRepository::new(state.pool()).list().await?;
    Ok(ok(testimonials))
}

/// GET /api/testimonials
async fn public_index(
    State(state): State<AppState>,
) -> Result<Json<ApiSuccess<Vec<Testimonial>>>, AppError> {
    list(&state).await
}

/// GET /api/admin/testimonials
async fn index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ApiSuccess<Vec<Testimonial>>>, AppError> {
    list(&state).await
}

/// GET /api/admin/testimonials/{id}
async fn show(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TestimonialId>,
) -> Result<Json<ApiSuccess<Testimonial>>, AppError> {
    let testimonial = TestimonialRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Testimonial"))?;

    Ok(ok(testimonial))
}

/// Ratings outside 1-5 are rejected, not clamped.
///
/// POST /api/admin/testimonials
#[instrument(skip(_admin, state))]
async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<TestimonialInput>,
) -> Result<Json<ApiSuccess<Testimonial>>, AppError> {
    let testimonial = input.validate()?;
    let testimonial = TestimonialRepository::new(state.pool())
        .create(&testimonial)
        .await?;
    Ok(ok(testimonial))
}

/// PUT /api/admin/testimonials/{id}
#[instrument(skip(_admin, state))]
async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TestimonialId>,
    JsonBody(input): JsonBody<TestimonialInput>,
) -> Result<Json<ApiSuccess<Testimonial>>, AppError> {
    let testimonial = input.validate()?;
    let testimonial = TestimonialRepository::new(state.pool())
        .update(id, &testimonial)
        .await?;
    Ok(ok(testimonial))
}

/// DELETE /api/admin/testimonials/{id}
async fn destroy(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TestimonialId>,
) -> Result<Json<ApiMessage>, AppError> {
    TestimonialRepository::new(state.pool()).delete(id).await?;
    Ok(done("Testimonial deleted"))
}
