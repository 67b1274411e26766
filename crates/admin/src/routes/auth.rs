//! Authentication route handlers for admin.
//!
//! Email/password login backed by a `tower-sessions` session. The login page
//! posts to the JSON endpoint and navigates to `/admin` on success.

use askama::Template;
use axum::{
    Json, Router,
    extract::State,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user};
use crate::extract::JsonBody;
use crate::middleware::{
    ADMIN_HOME_PATH, LOGIN_PATH, RequireAdmin, clear_current_admin, session_admin_id,
    set_current_admin,
};
use crate::models::CurrentAdmin;
use crate::services::AdminAuthService;
use crate::state::AppState;

use super::{ApiMessage, ApiSuccess, done, ok};

const LOGIN_ENDPOINT: &str = "/api/auth/login";
pub(crate) const LOGOUT_ENDPOINT: &str = "/api/auth/logout";

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginPageTemplate<'a> {
    login_endpoint: &'a str,
    home_path: &'a str,
}

/// Signed-in landing page.
#[derive(Template)]
#[template(path = "admin/home.html")]
struct AdminHomeTemplate<'a> {
    admin: &'a CurrentAdmin,
    logout_endpoint: &'a str,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(LOGIN_PATH, get(login_page))
        .route(ADMIN_HOME_PATH, get(admin_home))
        .route(LOGIN_ENDPOINT, post(login))
        .route(LOGOUT_ENDPOINT, post(logout))
        .route("/api/auth/session", get(current_session))
        .route("/api/auth/reset-password", post(reset_password))
}

fn render(template: &impl Template) -> Result<Html<String>, AppError> {
    template.render().map(Html).map_err(|e| {
        tracing::error!("Template render error: {e}");
        AppError::Internal(format!("template: {e}"))
    })
}

/// Render the login page.
///
/// GET /login
async fn login_page() -> Result<Html<String>, AppError> {
    render(&LoginPageTemplate {
        login_endpoint: LOGIN_ENDPOINT,
        home_path: ADMIN_HOME_PATH,
    })
}

/// Render the landing page for a signed-in admin.
///
/// GET /admin
async fn admin_home(RequireAdmin(admin): RequireAdmin) -> Result<Html<String>, AppError> {
    render(&AdminHomeTemplate {
        admin: &admin,
        logout_endpoint: LOGOUT_ENDPOINT,
    })
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: &'static str,
    pub admin: CurrentAdmin,
}

/// Verify credentials and start a session.
///
/// POST /api/auth/login
#[instrument(skip(state, session, body))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let admin = AdminAuthService::new(state.pool())
        .login(body.email.trim(), &body.password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "Admin login rejected"))?;

    set_current_admin(&session, admin.id)
        .await
        .map_err(|e| AppError::Internal(format!("session: {e}")))?;

    tracing::info!(admin_id = %admin.id, "Admin logged in");

    Ok(Json(LoginResponse {
        success: true,
        message: "Logged in",
        admin: admin.into(),
    }))
}

/// Logout and clear session.
///
/// POST /api/auth/logout
pub(crate) async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::warn!(error = %e, "Failed to delete session on logout");
    }
    clear_sentry_user();

    Redirect::to(LOGIN_PATH)
}

/// The signed-in admin, or `null` without a live session.
///
/// GET /api/auth/session
async fn current_session(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<ApiSuccess<Option<CurrentAdmin>>>, AppError> {
    let Some(admin_id) = session_admin_id(&session).await else {
        return Ok(ok(None));
    };

    let admin = AdminAuthService::new(state.pool())
        .current_admin(admin_id)
        .await?;

    Ok(ok(admin.map(CurrentAdmin::from)))
}

/// Password change request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Change the signed-in admin's password.
///
/// POST /api/auth/reset-password
#[instrument(skip(state, session, body))]
async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    JsonBody(body): JsonBody<ResetPasswordRequest>,
) -> Result<Json<ApiMessage>, AppError> {
    let admin_id = session_admin_id(&session).await;

    AdminAuthService::new(state.pool())
        .reset_password(
            admin_id,
            &body.current_password,
            &body.new_password,
            &body.confirm_password,
        )
        .await?;

    Ok(done("Password updated"))
}
