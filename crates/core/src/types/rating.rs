//! Testimonial star rating.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Error returned when a rating falls outside 1-5.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rating must be between {min} and {max} (got {got})", min = Rating::MIN, max = Rating::MAX)]
pub struct RatingError {
    /// The rejected value.
    pub got: i64,
}

/// A 1-5 star rating.
///
/// User input goes through [`Rating::new`], which rejects out-of-range values.
/// [`Rating::clamped`] exists for bulk imports where a best-effort value is
/// preferable to dropping the row.
///
/// ```
/// use tutorlink_core::Rating;
///
/// assert!(Rating::new(6).is_err());
/// assert_eq!(Rating::new(1).unwrap().get(), 1);
/// assert_eq!(Rating::clamped(9).get(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rating(i32);

impl Rating {
    /// Lowest allowed rating.
    pub const MIN: i32 = 1;
    /// Highest allowed rating.
    pub const MAX: i32 = 5;

    /// Validate a rating.
    ///
    /// # Errors
    ///
    /// Returns `RatingError` if `value` is not within 1-5.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        i32::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError { got: value })
    }

    /// Clamp an arbitrary value into 1-5.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        let clamped = value.clamp(i64::from(Self::MIN), i64::from(Self::MAX));
        // In range after the clamp above
        Self(i32::try_from(clamped).unwrap_or(Self::MAX))
    }

    /// The numeric value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Rating {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Rating {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(i64::from(raw))?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Rating {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert!(Rating::new(-1).is_err());
        assert!(Rating::new(i64::MAX).is_err());
        for v in 1..=5 {
            assert_eq!(Rating::new(v).unwrap().get(), i32::try_from(v).unwrap());
        }
    }

    #[test]
    fn test_clamped() {
        assert_eq!(Rating::clamped(-3).get(), 1);
        assert_eq!(Rating::clamped(3).get(), 3);
        assert_eq!(Rating::clamped(i64::MAX).get(), 5);
    }

    #[test]
    fn test_error_message() {
        let err = Rating::new(6).unwrap_err();
        assert_eq!(err.to_string(), "rating must be between 1 and 5 (got 6)");
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rating>("6").is_err());
        assert_eq!(serde_json::from_str::<Rating>("4").unwrap().get(), 4);
    }
}
