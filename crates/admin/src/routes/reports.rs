//! Dashboard and report endpoints.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use chrono::Utc;
use tracing::instrument;

use crate::db::ReportRepository;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::{DashboardChartData, DashboardStats, FullReport, ReportFilters};
use crate::services::ReportService;
use crate::state::AppState;

use super::{ApiSuccess, ok};

/// Build the reports router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/dashboard/chart", get(chart))
        .route("/api/admin/dashboard/stats", get(stats))
        .route("/api/admin/reports", get(report))
}

/// Six-month creation counts, top subjects and student growth.
///
/// GET /api/admin/dashboard/chart
#[instrument(skip(_admin, state))]
async fn chart(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ApiSuccess<DashboardChartData>>, AppError> {
    let data = ReportService::new(state.pool())
        .dashboard_chart(Utc::now())
        .await?;

    Ok(ok(data))
}

/// GET /api/admin/dashboard/stats
async fn stats(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ApiSuccess<DashboardStats>>, AppError> {
    let stats = ReportRepository::new(state.pool()).stats().await?;
    Ok(ok(stats))
}

/// Filtered snapshot of students, teachers, applications and requests.
///
/// Bad filters or query failures yield four empty lists, never an error.
///
/// GET /api/admin/reports
#[instrument(skip_all)]
async fn report(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    filters: Result<Query<ReportFilters>, QueryRejection>,
) -> Json<ApiSuccess<FullReport>> {
    let report = ReportService::new(state.pool())
        .full_report(filters.map(|Query(filters)| filters))
        .await;

    ok(report)
}
