//! Input validation helpers.
//!
//! Request bodies deserialize into loosely-typed `*Input` structs (plain
//! strings, optional numbers) and are then checked field by field, so one
//! bad request reports every problem at once instead of failing on the
//! first serde error.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tutorlink_core::Email;

/// Field-level validation failures, keyed by the camelCase field name.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    /// Empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Error set with a single message.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for a field.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Return `value` if no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation failed")?;
        for (field, messages) in &self.0 {
            write!(f, "; {field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// Field checks
// =============================================================================

/// Trim a required string and enforce a minimum character count.
pub fn required_text(errors: &mut ValidationErrors, field: &str, value: &str, min_chars: usize) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, "is required");
    } else if trimmed.chars().count() < min_chars {
        errors.add(field, format!("must be at least {min_chars} characters"));
    }
    trimmed.to_string()
}

/// Trim an optional string, treating blank as absent.
#[must_use]
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Phone numbers: 7-15 digits with an optional leading `+`; spaces and dashes are ignored.
pub fn phone(errors: &mut ValidationErrors, field: &str, value: &str) -> String {
    let compact: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    let digits = compact.strip_prefix('+').unwrap_or(&compact);

    if compact.is_empty() {
        errors.add(field, "is required");
    } else if !digits.chars().all(|c| c.is_ascii_digit()) || !(7..=15).contains(&digits.len()) {
        errors.add(field, "must be 7-15 digits");
    }
    compact
}

/// Optional email address.
pub fn optional_email(errors: &mut ValidationErrors, field: &str, value: Option<String>) -> Option<Email> {
    let raw = optional_text(value)?;
    match Email::parse(&raw) {
        Ok(email) => Some(email),
        Err(e) => {
            errors.add(field, e.to_string());
            None
        }
    }
}

/// Required email address.
pub fn required_email(errors: &mut ValidationErrors, field: &str, value: Option<String>) -> Option<Email> {
    if optional_text(value.clone()).is_none() {
        errors.add(field, "is required");
        return None;
    }
    optional_email(errors, field, value)
}

/// Absolute http(s) URL, as returned by the upload provider.
pub fn http_url(errors: &mut ValidationErrors, field: &str, value: &str) -> String {
    let trimmed = value.trim();
    match url::Url::parse(trimmed) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        _ => errors.add(field, "must be an http(s) URL"),
    }
    trimmed.to_string()
}

/// Optional http(s) URL.
pub fn optional_http_url(errors: &mut ValidationErrors, field: &str, value: Option<String>) -> Option<String> {
    optional_text(value).map(|v| http_url(errors, field, &v))
}

/// Subject list: trimmed, blanks dropped, case-insensitive duplicates removed
/// (first spelling wins), at least one required.
pub fn subjects(errors: &mut ValidationErrors, field: &str, values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let cleaned: Vec<String> = values
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect();

    if cleaned.is_empty() {
        errors.add(field, "at least one subject is required");
    }
    cleaned
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_finish() {
        assert_eq!(ValidationErrors::new().finish(5), Ok(5));

        let errors = ValidationErrors::single("name", "is required");
        let err = errors.finish(5).unwrap_err();
        assert_eq!(err.field("name").unwrap(), ["is required".to_string()]);
    }

    #[test]
    fn test_display_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("rating", "too high");
        errors.add("name", "is required");
        assert_eq!(
            errors.to_string(),
            "validation failed; name: is required; rating: too high"
        );
    }

    #[test]
    fn test_serializes_as_map() {
        let errors = ValidationErrors::single("phone", "must be 7-15 digits");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"phone": ["must be 7-15 digits"]}));
    }

    #[test]
    fn test_required_text() {
        let mut errors = ValidationErrors::new();
        assert_eq!(required_text(&mut errors, "name", "  Asha ", 2), "Asha");
        assert!(errors.is_empty());

        required_text(&mut errors, "name", "   ", 2);
        required_text(&mut errors, "district", "K", 2);
        assert_eq!(errors.field("name").unwrap(), ["is required".to_string()]);
        assert_eq!(
            errors.field("district").unwrap(),
            ["must be at least 2 characters".to_string()]
        );
    }

    #[test]
    fn test_phone() {
        let mut errors = ValidationErrors::new();
        assert_eq!(phone(&mut errors, "phone", "+977 98-4123-4567"), "+9779841234567");
        assert!(errors.is_empty());

        phone(&mut errors, "phone", "12ab");
        assert!(errors.field("phone").is_some());
    }

    #[test]
    fn test_emails() {
        let mut errors = ValidationErrors::new();
        assert!(optional_email(&mut errors, "email", None).is_none());
        assert!(optional_email(&mut errors, "email", Some("  ".to_string())).is_none());
        assert!(errors.is_empty());

        assert!(required_email(&mut errors, "email", None).is_none());
        assert_eq!(errors.field("email").unwrap(), ["is required".to_string()]);
    }

    #[test]
    fn test_http_url() {
        let mut errors = ValidationErrors::new();
        http_url(&mut errors, "photoUrls", "https://utfs.io/f/abc.jpg");
        assert!(errors.is_empty());

        http_url(&mut errors, "photoUrls", "javascript:alert(1)");
        assert!(errors.field("photoUrls").is_some());
    }

    #[test]
    fn test_subjects_dedupes_case_insensitively() {
        let mut errors = ValidationErrors::new();
        let cleaned = subjects(
            &mut errors,
            "subjects",
            vec!["Math".into(), " math ".into(), "".into(), "English".into()],
        );
        assert_eq!(cleaned, vec!["Math".to_string(), "English".to_string()]);
        assert!(errors.is_empty());

        subjects(&mut errors, "subjects", vec![" ".into()]);
        assert!(errors.field("subjects").is_some());
    }
}
