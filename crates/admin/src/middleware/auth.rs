//! Authentication gate and extractors for admin.
//!
//! Two layers of protection:
//!
//! - [`gate`] runs on every request and only checks that the session holds
//!   an admin id. It redirects or rejects anonymous access to `/admin/**`
//!   and `/api/admin/**`, and sends signed-in visitors away from `/login`.
//! - [`RequireAdmin`] is used by data handlers and re-loads the admin, so a
//!   session whose admin was deleted stops working on the next data read.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use tutorlink_core::AdminId;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentAdmin, session_keys};
use crate::services::AdminAuthService;
use crate::state::AppState;

/// Login surface.
pub const LOGIN_PATH: &str = "/login";
/// Admin landing page.
pub const ADMIN_HOME_PATH: &str = "/admin";

// =============================================================================
// Route gate
// =============================================================================

/// What the gate does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Let the request through.
    Continue,
    /// Anonymous page request under `/admin`.
    RedirectToLogin,
    /// Signed-in request for the login page.
    RedirectToAdmin,
    /// Anonymous API request under `/api/admin`.
    Unauthorized,
}

fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Decide from the path and whether the session holds an admin id.
#[must_use]
pub fn gate_decision(path: &str, has_session: bool) -> GateDecision {
    if has_session {
        if path == LOGIN_PATH {
            return GateDecision::RedirectToAdmin;
        }
        return GateDecision::Continue;
    }

    if under(path, "/api/admin") {
        GateDecision::Unauthorized
    } else if under(path, ADMIN_HOME_PATH) {
        GateDecision::RedirectToLogin
    } else {
        GateDecision::Continue
    }
}

/// Middleware applying [`gate_decision`].
pub async fn gate(session: Session, request: Request, next: Next) -> Response {
    let has_session = session_admin_id(&session).await.is_some();

    match gate_decision(request.uri().path(), has_session) {
        GateDecision::Continue => next.run(request).await,
        GateDecision::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
        GateDecision::RedirectToAdmin => Redirect::to(ADMIN_HOME_PATH).into_response(),
        GateDecision::Unauthorized => AppError::Unauthorized.into_response(),
    }
}

// =============================================================================
// Extractors
// =============================================================================

/// Extractor that requires a session whose admin still exists.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

/// Rejection for [`RequireAdmin`].
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// JSON error (for API requests, or a failed lookup).
    Api(AppError),
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Api(err) => err.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let is_api = parts.uri.path().starts_with("/api/");
        let unauthenticated = || {
            if is_api {
                AdminAuthRejection::Api(AppError::Unauthorized)
            } else {
                AdminAuthRejection::RedirectToLogin
            }
        };

        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::Api(AppError::Unauthorized))?;

        let admin_id = session_admin_id(session).await.ok_or_else(unauthenticated)?;

        let admin = AdminAuthService::new(state.pool())
            .current_admin(admin_id)
            .await
            .map_err(|e| AdminAuthRejection::Api(e.into()))?;

        match admin {
            Some(admin) => {
                set_sentry_user(admin.id.as_i32(), Some(admin.email.as_str()));
                Ok(Self(admin.into()))
            }
            None => {
                tracing::warn!(admin_id = %admin_id, "Session refers to a deleted admin");
                // Best effort; the session is dead either way
                let _ = session.flush().await;
                Err(unauthenticated())
            }
        }
    }
}

// =============================================================================
// Session helpers
// =============================================================================

/// Admin id stored in the session, if any.
pub async fn session_admin_id(session: &Session) -> Option<AdminId> {
    session
        .get::<AdminId>(session_keys::ADMIN_ID)
        .await
        .ok()
        .flatten()
}

/// Start an authenticated session for `admin_id`.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin_id: AdminId,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::ADMIN_ID, admin_id).await
}

/// End the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{StatusCode, header},
        routing::{get, post},
    };
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::middleware::session_layer;

    #[test]
    fn test_anonymous_requests() {
        assert_eq!(gate_decision("/admin", false), GateDecision::RedirectToLogin);
        assert_eq!(gate_decision("/admin/students", false), GateDecision::RedirectToLogin);
        assert_eq!(gate_decision("/api/admin", false), GateDecision::Unauthorized);
        assert_eq!(gate_decision("/api/admin/reports", false), GateDecision::Unauthorized);
        assert_eq!(gate_decision("/login", false), GateDecision::Continue);
        assert_eq!(gate_decision("/api/students", false), GateDecision::Continue);
        assert_eq!(gate_decision("/health", false), GateDecision::Continue);
    }

    #[test]
    fn test_prefix_must_end_at_segment() {
        assert_eq!(gate_decision("/administrator", false), GateDecision::Continue);
        assert_eq!(gate_decision("/api/administer", false), GateDecision::Continue);
    }

    #[test]
    fn test_signed_in_requests() {
        assert_eq!(gate_decision("/login", true), GateDecision::RedirectToAdmin);
        assert_eq!(gate_decision("/admin", true), GateDecision::Continue);
        assert_eq!(gate_decision("/api/admin/reports", true), GateDecision::Continue);
    }

    fn gated_app() -> Router {
        Router::new()
            .route("/admin", get(|| async { "home" }))
            .route("/api/admin/ping", get(|| async { "pong" }))
            .route("/login", get(|| async { "login form" }))
            .route(
                "/test/sign-in",
                post(|session: Session| async move {
                    set_current_admin(&session, AdminId::new(1)).await.unwrap();
                    "signed in"
                }),
            )
            .route(
                crate::routes::auth::LOGOUT_ENDPOINT,
                post(crate::routes::auth::logout),
            )
            .layer(axum::middleware::from_fn(gate))
            .layer(session_layer(MemoryStore::default(), false))
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn test_gate_rejects_anonymous_api() {
        let response = gated_app()
            .oneshot(get_request("/api/admin/ping", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_gate_redirects_anonymous_page() {
        let response = gated_app()
            .oneshot(get_request("/admin", None))
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), LOGIN_PATH);
    }

    #[tokio::test]
    async fn test_gate_follows_session() {
        let app = gated_app();

        let response = app
            .clone()
            .oneshot(
                axum::http::Request::post("/test/sign-in")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("admin-session="));
        assert!(set_cookie.contains("HttpOnly"));
        let cookie = set_cookie.split(';').next().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(get_request("/api/admin/ping", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get_request("/login", Some(&cookie)))
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), ADMIN_HOME_PATH);
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let app = gated_app();

        let response = app
            .clone()
            .oneshot(
                axum::http::Request::post("/test/sign-in")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        let cookie = set_cookie.split(';').next().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                axum::http::Request::post(crate::routes::auth::LOGOUT_ENDPOINT)
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), LOGIN_PATH);

        // The old cookie no longer names a stored session.
        let response = app
            .oneshot(get_request("/api/admin/ping", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
