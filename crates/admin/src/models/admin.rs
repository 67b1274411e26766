//! Admin account domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tutorlink_core::{AdminId, Email};

/// A back-office admin (password hash excluded).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    /// Unique admin ID.
    pub id: AdminId,
    /// Login email (exact-match lookup).
    pub email: Email,
    /// Display name.
    pub name: String,
    /// When the admin was created.
    pub created_at: DateTime<Utc>,
    /// When the admin was last updated (password resets bump this).
    pub updated_at: DateTime<Utc>,
}
