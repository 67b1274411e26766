//! Public notices shown as banners on the site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tutorlink_core::NoticeId;

use crate::validation::{self, ValidationErrors};

/// Most photos a notice may carry.
pub const MAX_PHOTOS: usize = 10;

/// A published notice.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: NoticeId,
    pub text: String,
    pub photo_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Notice form; photo URLs come from the upload provider.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NoticeInput {
    pub text: String,
    pub photo_urls: Vec<String>,
}

/// Validated [`NoticeInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotice {
    pub text: String,
    pub photo_urls: Vec<String>,
}

impl NoticeInput {
    /// # Errors
    ///
    /// Rejects empty text, more than [`MAX_PHOTOS`] photos, or non-http(s) URLs.
    pub fn validate(self) -> Result<NewNotice, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let text = validation::required_text(&mut errors, "text", &self.text, 1);

        if self.photo_urls.len() > MAX_PHOTOS {
            errors.add("photoUrls", format!("at most {MAX_PHOTOS} photos are allowed"));
        }
        let photo_urls = self
            .photo_urls
            .iter()
            .map(|u| validation::http_url(&mut errors, "photoUrls", u))
            .collect();

        errors.finish(NewNotice { text, photo_urls })
    }
}
