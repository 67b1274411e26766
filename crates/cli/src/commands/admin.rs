//! Admin account management.
//!
//! Admins are only ever created here; the web app has no sign-up.
//!
//! # Usage
//!
//! ```bash
//! tl-cli admin create -e admin@tutorlink.com.np -n "Office Admin" -p 'long enough'
//! tl-cli admin set-password -e admin@tutorlink.com.np -p 'a new password'
//! ```

use tutorlink_admin::services::{AdminAuthError, AdminAuthService};

use super::ConnectError;

/// Errors that can occur during admin operations.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// Could not connect.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Rejected by the auth service.
    #[error("{0}")]
    Auth(#[from] AdminAuthError),
}

/// Create an admin account.
///
/// # Errors
///
/// Returns an error for an invalid email, a short password, or an email
/// that is already taken.
pub async fn create(email: &str, name: &str, password: &str) -> Result<(), AdminError> {
    let pool = super::connect().await?;

    let admin = AdminAuthService::new(&pool)
        .create_admin(email, name, password)
        .await?;

    tracing::info!(
        "Admin created successfully! ID: {}, Email: {}",
        admin.id,
        admin.email
    );
    Ok(())
}

/// Replace an admin's password.
///
/// # Errors
///
/// Returns an error for a short password or an unknown email.
pub async fn set_password(email: &str, password: &str) -> Result<(), AdminError> {
    let pool = super::connect().await?;

    AdminAuthService::new(&pool)
        .set_password(email, password)
        .await?;

    tracing::info!("Password updated for {}", email);
    Ok(())
}
