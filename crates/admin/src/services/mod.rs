//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Email/password login and password changes
//! - `email` - Transactional email via SMTP
//! - `registration` - Student/teacher registration and applications
//! - `reports` - Dashboard rollups and filtered reports

pub mod auth;
pub mod email;
pub mod registration;
pub mod reports;

pub use auth::{AdminAuthError, AdminAuthService};
pub use email::{BroadcastOutcome, EmailError, EmailService, OfficeInvitation};
pub use registration::{RegistrationError, RegistrationService};
pub use reports::ReportService;
