//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Security headers
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Route gate ([`auth::gate`])
//!
//! Data handlers additionally take [`RequireAdmin`], which re-checks that
//! the session's admin still exists.

pub mod auth;
pub mod session;

pub use auth::{
    ADMIN_HOME_PATH, GateDecision, LOGIN_PATH, RequireAdmin, clear_current_admin, gate,
    gate_decision, session_admin_id, set_current_admin,
};
pub use session::{SESSION_COOKIE_NAME, create_session_layer, session_layer};
