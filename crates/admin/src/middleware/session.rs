//! Session middleware configuration for admin.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The cookie
//! carries only the opaque session id; the admin id lives in the session
//! record under [`crate::models::session_keys::ADMIN_ID`].

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "admin-session";

/// Session lifetime: 7 days since last activity.
pub const SESSION_EXPIRY_DAYS: i64 = 7;

/// Create the session layer with `PostgreSQL` store.
///
/// # Errors
///
/// Returns the store's message if the schema or table name is rejected.
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> Result<SessionManagerLayer<PostgresStore>, String> {
    // Table is created by the admin migrations, not by the store
    let store = PostgresStore::new(pool.clone())
        .with_schema_name("tutorlink")
        .map_err(|e| e.to_string())?
        .with_table_name("session")
        .map_err(|e| e.to_string())?;

    Ok(session_layer(store, config.is_secure()))
}

/// Cookie settings shared by the real store and test stores.
#[must_use]
pub fn session_layer<S: SessionStore + Clone>(store: S, secure: bool) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::days(SESSION_EXPIRY_DAYS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
