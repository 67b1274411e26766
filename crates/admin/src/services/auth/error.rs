//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during admin authentication operations.
///
/// Login failures collapse to [`AdminAuthError::InvalidCredentials`] whether
/// the email is unknown or the password is wrong.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Unknown email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No admin session.
    #[error("unauthorized")]
    Unauthorized,

    /// Password reset: `current` did not match the stored hash.
    #[error("current password is incorrect")]
    InvalidCurrentPassword,

    /// Password reset: new password and confirmation differ.
    #[error("passwords do not match")]
    Mismatch,

    /// New password shorter than the minimum.
    #[error("password must be at least {min} characters")]
    TooShort {
        /// Required minimum length.
        min: usize,
    },

    /// Admin already exists.
    #[error("an admin with this email already exists")]
    AlreadyExists,

    /// Invalid email supplied when creating an admin.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] tutorlink_core::EmailError),

    /// Password hashing failed.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
