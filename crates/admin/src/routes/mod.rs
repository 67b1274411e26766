//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness
//! GET  /health/ready                        - Readiness (database ping)
//!
//! # Auth
//! GET  /login                               - Login page
//! GET  /admin                               - Signed-in landing page
//! POST /api/auth/login                      - Email/password login
//! POST /api/auth/logout                     - End session, redirect to /login
//! GET  /api/auth/session                    - Current admin or null
//! POST /api/auth/reset-password             - Change own password
//!
//! # Public
//! POST /api/students                        - Student registration
//! POST /api/teachers                        - Teacher registration
//! POST /api/applications                    - Teacher applies for a request
//! GET  /api/notices/active                  - Notices not yet shown to this browser
//! GET  /api/testimonials                    - Published testimonials
//!
//! # Admin (session required)
//! /api/admin/students[/{id}]
//! /api/admin/teachers[/{id}[/approve|/reject|/standing]]
//! /api/admin/tuition-requests[/{id}[/approve]]
//! /api/admin/applications[/{id}]
//! /api/admin/notifications[/unread-count|/read-all|/read|/{id}[/read]]
//! /api/admin/notices[/{id}]
//! /api/admin/testimonials[/{id}]
//! /api/admin/dashboard/chart, /api/admin/dashboard/stats, /api/admin/reports
//! /api/admin/emails/{approval|rejection|password-reset|office-invitation|vacancy}
//! ```
//!
//! Every JSON response carries `success`. Data comes back under `data`.

pub mod applications;
pub mod auth;
pub mod emails;
pub mod notices;
pub mod notifications;
pub mod reports;
pub mod students;
pub mod teachers;
pub mod testimonials;
pub mod tuition_requests;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Successful JSON envelope.
#[derive(Debug, Serialize)]
pub struct ApiSuccess<T> {
    pub success: bool,
    pub data: T,
}

/// Wrap `data` in a success envelope.
pub const fn ok<T>(data: T) -> Json<ApiSuccess<T>> {
    Json(ApiSuccess {
        success: true,
        data,
    })
}

/// Success envelope carrying a message instead of data.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: &'static str,
}

/// Acknowledge a write with a short message.
pub const fn done(message: &'static str) -> Json<ApiMessage> {
    Json(ApiMessage {
        success: true,
        message,
    })
}

/// Offset pagination shared by list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 50,
        }
    }
}

impl Page {
    const MAX_PER_PAGE: i64 = 200;

    /// `(limit, offset)` with the page size clamped to 1..=200.
    ///
    /// Offsets past `i64::MAX` saturate, which simply yields an empty page.
    #[must_use]
    pub const fn limit_offset(self) -> (i64, i64) {
        let limit = if self.per_page < 1 {
            1
        } else if self.per_page > Self::MAX_PER_PAGE {
            Self::MAX_PER_PAGE
        } else {
            self.per_page
        };
        let page = if self.page < 1 { 1 } else { self.page };
        (limit, (page - 1).saturating_mul(limit))
    }
}

/// Build the complete application router (without outer layers).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(auth::router())
        .merge(students::router())
        .merge(teachers::router())
        .merge(tuition_requests::router())
        .merge(applications::router())
        .merge(notifications::router())
        .merge(notices::router())
        .merge(testimonials::router())
        .merge(reports::router())
        .merge(emails::router())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, header},
    };
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::EmailConfig;
    use crate::services::EmailService;

    /// Full router over a lazy pool; only routes that never touch the database are exercised.
    fn app() -> Router {
        let email = EmailService::new(&EmailConfig {
            smtp_host: "smtp.tutorlink.test".to_string(),
            smtp_port: 587,
            smtp_username: "mailer".to_string(),
            smtp_password: SecretString::from("pass"),
            from_address: "office@tutorlink.test".to_string(),
        })
        .unwrap();
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/tutorlink_test")
            .unwrap();
        let config = crate::config::tests::test_config("http://localhost:3001");

        crate::app(
            AppState::new(config, pool, email),
            crate::middleware::session_layer(MemoryStore::default(), false),
        )
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_page_renders() {
        let response = app().oneshot(get("/login")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("/api/auth/login"));
    }

    #[tokio::test]
    async fn test_admin_api_requires_session() {
        for uri in [
            "/api/admin/students",
            "/api/admin/reports",
            "/api/admin/dashboard/chart",
        ] {
            let response = app().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_admin_page_redirects_to_login() {
        let response = app().oneshot(get("/admin")).await.unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn test_security_headers() {
        let response = app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    }

    #[test]
    fn test_page_limit_offset() {
        assert_eq!(Page::default().limit_offset(), (50, 0));
        assert_eq!(Page { page: 3, per_page: 20 }.limit_offset(), (20, 40));
        assert_eq!(Page { page: 0, per_page: 0 }.limit_offset(), (1, 0));
        assert_eq!(Page { page: 2, per_page: 1000 }.limit_offset(), (200, 200));
    }

    #[test]
    fn test_page_limit_offset_saturates() {
        assert_eq!(
            Page { page: i64::MAX, per_page: 50 }.limit_offset(),
            (50, i64::MAX)
        );
        assert_eq!(
            Page { page: i64::MIN, per_page: i64::MIN }.limit_offset(),
            (1, 0)
        );
    }
}
