//! Admin authentication service.
//!
//! Email + password login against argon2id hashes. The session itself is
//! managed by `tower-sessions`; this service only answers "who is this" and
//! "may they change their password".

mod error;

pub use error::AdminAuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::instrument;

use tutorlink_core::{AdminId, Email};

use crate::db::{AdminRepository, RepositoryError};
use crate::models::Admin;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    admins: AdminRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            admins: AdminRepository::new(pool),
        }
    }

    /// Verify an email/password pair.
    ///
    /// The email must match exactly. Repeating a successful login with the
    /// same credentials keeps succeeding until the password changes.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` for an unknown email, a
    /// malformed email or a wrong password.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Admin, AdminAuthError> {
        let email = Email::parse(email).map_err(|_| AdminAuthError::InvalidCredentials)?;

        let (admin, password_hash) = self
            .admins
            .get_with_hash_by_email(&email)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;
        Ok(admin)
    }

    /// Resolve a session's admin, or `None` if the account has since been deleted.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::Repository` if the lookup fails.
    pub async fn current_admin(&self, id: AdminId) -> Result<Option<Admin>, AdminAuthError> {
        Ok(self.admins.get_by_id(id).await?)
    }

    /// Change the signed-in admin's password.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` without a session, `InvalidCurrentPassword` if
    /// `current` is wrong, `Mismatch` if `new` and `confirm` differ, and
    /// `TooShort` if `new` is under [`MIN_PASSWORD_LENGTH`].
    #[instrument(skip(self, current, new, confirm))]
    pub async fn reset_password(
        &self,
        admin_id: Option<AdminId>,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> Result<(), AdminAuthError> {
        let admin_id = admin_id.ok_or(AdminAuthError::Unauthorized)?;

        let stored = match self.admins.get_password_hash(admin_id).await {
            Ok(hash) => hash,
            Err(RepositoryError::NotFound) => return Err(AdminAuthError::Unauthorized),
            Err(e) => return Err(e.into()),
        };
        verify_password(current, &stored).map_err(|_| AdminAuthError::InvalidCurrentPassword)?;

        if new != confirm {
            return Err(AdminAuthError::Mismatch);
        }
        validate_password(new)?;

        let hash = hash_password(new)?;
        self.admins.update_password(admin_id, &hash).await?;
        tracing::info!(admin_id = %admin_id, "Admin password changed");
        Ok(())
    }

    /// Create an admin account (CLI only).
    ///
    /// # Errors
    ///
    /// Returns `InvalidEmail`, `TooShort`, or `AlreadyExists` for bad input.
    pub async fn create_admin(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<Admin, AdminAuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let hash = hash_password(password)?;

        self.admins
            .create(&email, name.trim(), &hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AdminAuthError::AlreadyExists,
                other => AdminAuthError::Repository(other),
            })
    }

    /// Overwrite an admin's password without knowing the old one (CLI only).
    ///
    /// # Errors
    ///
    /// Returns `TooShort` for a short password and `Repository(NotFound)`
    /// for an unknown email.
    pub async fn set_password(&self, email: &str, password: &str) -> Result<(), AdminAuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let hash = hash_password(password)?;
        self.admins.update_password_by_email(&email, &hash).await?;
        Ok(())
    }
}

// =============================================================================
// Password helpers
// =============================================================================

/// Check password rules.
///
/// # Errors
///
/// Returns `AdminAuthError::TooShort` below [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password(password: &str) -> Result<(), AdminAuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminAuthError::TooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

/// Hash a password with argon2id and a random salt.
///
/// # Errors
///
/// Returns `AdminAuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AdminAuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AdminAuthError::PasswordHash)
}

/// Verify a password against a PHC hash string.
fn verify_password(password: &str, hash: &str) -> Result<(), AdminAuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AdminAuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AdminAuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AdminAuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("same-password").unwrap(), hash_password("same-password").unwrap());
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AdminAuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AdminAuthError::TooShort { min: 8 })
        ));
        assert!(validate_password("exactly8").is_ok());
        // counted in characters, not bytes
        assert!(validate_password("पासवर्ड").is_err());
    }
}
