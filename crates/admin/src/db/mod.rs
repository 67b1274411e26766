//! Database operations for the Tutorlink `PostgreSQL` database.
//!
//! ## Tables (schema `tutorlink`)
//!
//! - `admin` - Back-office accounts (argon2 password hashes)
//! - `session` - tower-sessions storage for the `admin-session` cookie
//! - `student` - Registered tuition seekers
//! - `tuition_request` - One per student registration
//! - `teacher` - Registered tutors with their immutable `teacher_code`
//! - `application` - A teacher's bid on a tuition request
//! - `notification` - Back-office activity feed
//! - `notice` - Public banners
//! - `testimonial` - Published reviews
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p tutorlink-cli -- migrate
//! ```

pub mod admins;
pub mod applications;
pub mod notices;
pub mod notifications;
pub mod reports;
pub mod students;
pub mod teachers;
pub mod testimonials;
pub mod tuition_requests;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admins::AdminRepository;
pub use applications::ApplicationRepository;
pub use notices::NoticeRepository;
pub use notifications::NotificationRepository;
pub use reports::ReportRepository;
pub use students::StudentRepository;
pub use teachers::TeacherRepository;
pub use testimonials::TestimonialRepository;
pub use tuition_requests::TuitionRequestRepository;

/// Postgres error code for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres error code for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, duplicate application).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Stored data failed domain validation.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl RepositoryError {
    /// Translate constraint violations into `Conflict`, leaving other errors as-is.
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return Self::Conflict(
                        db_err
                            .constraint()
                            .map_or_else(|| "unique".to_string(), ToString::to_string),
                    );
                }
                Some(FOREIGN_KEY_VIOLATION) => return Self::NotFound,
                _ => {}
            }
        }
        Self::Database(err)
    }
}

/// `ILIKE` pattern matching `search` anywhere, with `%`, `_` and `\` taken literally.
pub(crate) fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Map "no rows affected" onto `NotFound`.
pub(crate) const fn expect_affected(rows: u64) -> Result<(), RepositoryError> {
    if rows == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
