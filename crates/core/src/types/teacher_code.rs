//! Public teacher identifier.
//!
//! Every teacher gets a short code at registration (`TL-7KX2QF`). Teachers
//! quote it when applying for tuition requests, so it must stay stable for
//! the lifetime of the record.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing a [`TeacherCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TeacherCodeError {
    /// Missing the `TL-` prefix.
    #[error("teacher code must start with {prefix}", prefix = TeacherCode::PREFIX)]
    MissingPrefix,
    /// Suffix has the wrong length or contains characters outside the alphabet.
    #[error("teacher code must end with {len} characters from {alphabet}", len = TeacherCode::SUFFIX_LEN, alphabet = TeacherCode::ALPHABET_STR)]
    InvalidSuffix,
}

/// A teacher code such as `TL-7KX2QF`.
///
/// The suffix alphabet leaves out `0`, `1`, `I` and `O` so codes survive
/// being read over the phone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TeacherCode(String);

impl TeacherCode {
    /// Prefix shared by all codes.
    pub const PREFIX: &'static str = "TL-";
    /// Number of characters after the prefix.
    pub const SUFFIX_LEN: usize = 6;
    /// Characters a suffix may contain.
    pub const ALPHABET: &'static [u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    const ALPHABET_STR: &'static str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

    /// Parse a code, accepting lowercase input.
    ///
    /// # Errors
    ///
    /// Returns `TeacherCodeError` if the prefix or suffix is invalid.
    pub fn parse(s: &str) -> Result<Self, TeacherCodeError> {
        let upper = s.trim().to_ascii_uppercase();
        let suffix = upper
            .strip_prefix(Self::PREFIX)
            .ok_or(TeacherCodeError::MissingPrefix)?;
        Self::check_suffix(suffix)?;
        Ok(Self(upper))
    }

    /// Build a code from a generated suffix.
    ///
    /// # Errors
    ///
    /// Returns `TeacherCodeError::InvalidSuffix` if the suffix is not
    /// `SUFFIX_LEN` characters from `ALPHABET`.
    pub fn from_suffix(suffix: &str) -> Result<Self, TeacherCodeError> {
        Self::check_suffix(suffix)?;
        Ok(Self(format!("{}{suffix}", Self::PREFIX)))
    }

    fn check_suffix(suffix: &str) -> Result<(), TeacherCodeError> {
        let valid = suffix.len() == Self::SUFFIX_LEN
            && suffix.bytes().all(|b| Self::ALPHABET.contains(&b));
        if valid {
            Ok(())
        } else {
            Err(TeacherCodeError::InvalidSuffix)
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeacherCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TeacherCode {
    type Err = TeacherCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for TeacherCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for TeacherCode {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for TeacherCode {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for TeacherCode {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case() {
        let code = TeacherCode::parse(" tl-7kx2qf ").unwrap();
        assert_eq!(code.as_str(), "TL-7KX2QF");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(TeacherCode::parse("7KX2QF"), Err(TeacherCodeError::MissingPrefix));
        assert_eq!(TeacherCode::parse("TL-7KX2Q"), Err(TeacherCodeError::InvalidSuffix));
        // 0 and O are excluded from the alphabet
        assert_eq!(TeacherCode::parse("TL-0KX2QF"), Err(TeacherCodeError::InvalidSuffix));
        assert_eq!(TeacherCode::parse("TL-OKX2QF"), Err(TeacherCodeError::InvalidSuffix));
    }

    #[test]
    fn test_from_suffix() {
        assert_eq!(TeacherCode::from_suffix("ABC234").unwrap().as_str(), "TL-ABC234");
        assert!(TeacherCode::from_suffix("abc234").is_err());
    }

    #[test]
    fn test_alphabet_str_matches_bytes() {
        assert_eq!(TeacherCode::ALPHABET_STR.as_bytes(), TeacherCode::ALPHABET);
    }
}
