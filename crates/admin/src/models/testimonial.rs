//! Published reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tutorlink_core::{Rating, TestimonialId, TestimonialRole};

use crate::validation::{self, ValidationErrors};

/// A testimonial as stored.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: TestimonialId,
    pub name: String,
    pub role: TestimonialRole,
    pub message: String,
    pub rating: Rating,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Testimonial form. `rating` is kept wide so out-of-range values surface as
/// field errors rather than deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestimonialInput {
    pub name: String,
    pub role: Option<TestimonialRole>,
    pub message: String,
    pub rating: Option<i64>,
    pub location: Option<String>,
}

/// Validated [`TestimonialInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTestimonial {
    pub name: String,
    pub role: TestimonialRole,
    pub message: String,
    pub rating: Rating,
    pub location: Option<String>,
}

impl TestimonialInput {
    /// # Errors
    ///
    /// Returns every failing field at once.
    pub fn validate(self) -> Result<NewTestimonial, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = validation::required_text(&mut errors, "name", &self.name, 2);
        let message = validation::required_text(&mut errors, "message", &self.message, 10);

        let role = self.role.unwrap_or_else(|| {
            errors.add("role", "is required");
            TestimonialRole::Student
        });

        let rating = match self.rating.map(Rating::new) {
            Some(Ok(rating)) => rating,
            Some(Err(e)) => {
                errors.add("rating", e.to_string());
                Rating::clamped(0)
            }
            None => {
                errors.add("rating", "is required");
                Rating::clamped(0)
            }
        };

        errors.finish(NewTestimonial {
            name,
            role,
            message,
            rating,
            location: validation::optional_text(self.location),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(rating: i64) -> TestimonialInput {
        TestimonialInput {
            name: "Gita".to_string(),
            role: Some(TestimonialRole::Parent),
            message: "Found a great maths tutor in a week.".to_string(),
            rating: Some(rating),
            location: Some("Pokhara".to_string()),
        }
    }

    #[test]
    fn test_rating_bounds() {
        assert_eq!(input(1).validate().unwrap().rating.get(), 1);
        assert_eq!(input(5).validate().unwrap().rating.get(), 5);

        let errors = input(6).validate().unwrap_err();
        assert!(errors.field("rating").is_some());
        assert!(errors.field("message").is_none());

        assert!(input(0).validate().unwrap_err().field("rating").is_some());
    }

    #[test]
    fn test_short_message_rejected() {
        let short = TestimonialInput {
            message: "Good".to_string(),
            ..input(4)
        };
        assert!(short.validate().unwrap_err().field("message").is_some());
    }

    #[test]
    fn test_role_from_json() {
        let parsed: TestimonialInput = serde_json::from_value(serde_json::json!({
            "name": "Hari",
            "role": "teacher",
            "message": "Steady stream of students.",
            "rating": 4
        }))
        .unwrap();
        assert_eq!(parsed.validate().unwrap().role, TestimonialRole::Teacher);
    }
}
