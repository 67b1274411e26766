//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

use tutorlink_core::{AdminId, Email};

use super::Admin;

/// Admin identity returned by the session endpoint and injected into
/// authenticated handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentAdmin {
    /// Admin's database ID.
    pub id: AdminId,
    /// Admin's email address.
    pub email: Email,
    /// Admin's display name.
    pub name: String,
}

impl From<Admin> for CurrentAdmin {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            email: admin.email,
            name: admin.name,
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key holding the logged-in admin's ID. Its presence is what the route gate checks.
    pub const ADMIN_ID: &str = "admin_id";
}
