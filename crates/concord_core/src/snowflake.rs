//! Discord snowflake identifiers.

use concord_error::ValidationError;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static SNOWFLAKE_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[0-9]{17,20}$").expect("snowflake regex is valid"));

/// A Discord snowflake: the 17-20 digit numeric id Discord assigns to
/// every object.
///
/// Stored as the original decimal string so ids above 2^53 survive JSON
/// round trips untouched.
///
/// # Examples
///
/// ```
/// use concord_core::Snowflake;
///
/// let id = Snowflake::parse("server_id", "81384788765712384").unwrap();
/// assert_eq!(id.as_str(), "81384788765712384");
/// assert!(Snowflake::parse("server_id", "not-an-id").is_err());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct Snowflake(String);

impl Snowflake {
    /// Validate and wrap a snowflake string.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming `attribute` when the value is
    /// not 17-20 decimal digits.
    #[track_caller]
    pub fn parse(attribute: &str, value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if Self::is_valid(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::new(
                attribute,
                format!("{:?} is not a Discord snowflake (17-20 digits)", value),
            ))
        }
    }

    /// True when `value` matches the snowflake shape.
    pub fn is_valid(value: &str) -> bool {
        SNOWFLAKE_RE.is_match(value)
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Snowflake> for String {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_typical_ids() {
        for id in ["81384788765712384", "10028172894199812096"] {
            assert!(Snowflake::is_valid(id), "{id} should be valid");
        }
    }

    #[test]
    fn test_rejects_non_ids() {
        for id in ["", "abc", "123", "1234567890123456789012", "1234567890123456a"] {
            assert!(!Snowflake::is_valid(id), "{id} should be invalid");
        }
    }

    #[test]
    fn test_error_names_attribute() {
        let err = Snowflake::parse("channel_id", "nope").unwrap_err();
        assert_eq!(err.attribute(), "channel_id");
    }
}
