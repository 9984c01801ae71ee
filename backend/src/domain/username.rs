//! Authenticated principal identifier.
//!
//! A [`Username`] is opaque to the domain: the core never authenticates it,
//! only compares it. Validation keeps obviously malformed values (blank,
//! padded, oversized) out of the stores.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum accepted username length in characters.
pub const USERNAME_MAX: usize = 64;

/// Validation errors returned by [`Username::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsernameValidationError {
    Empty,
    SurroundingWhitespace,
    TooLong { max: usize },
    ControlCharacters,
}

impl fmt::Display for UsernameValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "username must not be empty"),
            Self::SurroundingWhitespace => {
                write!(f, "username must not start or end with whitespace")
            }
            Self::TooLong { max } => write!(f, "username must be at most {max} characters"),
            Self::ControlCharacters => write!(f, "username must not contain control characters"),
        }
    }
}

impl std::error::Error for UsernameValidationError {}

/// Unique user handle, one per access record.
///
/// # Examples
/// ```
/// use backend::domain::Username;
///
/// let alice = Username::new("alice").expect("valid username");
/// assert_eq!(alice.as_ref(), "alice");
/// assert!(Username::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "alice")]
pub struct Username(String);

impl Username {
    /// Validate and construct a username.
    pub fn new(value: impl Into<String>) -> Result<Self, UsernameValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(UsernameValidationError::Empty);
        }
        if value.trim() != value {
            return Err(UsernameValidationError::SurroundingWhitespace);
        }
        if value.chars().count() > USERNAME_MAX {
            return Err(UsernameValidationError::TooLong { max: USERNAME_MAX });
        }
        if value.chars().any(char::is_control) {
            return Err(UsernameValidationError::ControlCharacters);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UsernameValidationError::Empty)]
    #[case("   ", UsernameValidationError::Empty)]
    #[case(" bob", UsernameValidationError::SurroundingWhitespace)]
    #[case("bob\n", UsernameValidationError::SurroundingWhitespace)]
    #[case("bo\u{7}b", UsernameValidationError::ControlCharacters)]
    fn rejects_malformed_usernames(#[case] raw: &str, #[case] expected: UsernameValidationError) {
        assert_eq!(Username::new(raw), Err(expected));
    }

    #[rstest]
    fn rejects_overlong_usernames() {
        let raw = "a".repeat(USERNAME_MAX + 1);
        assert_eq!(
            Username::new(raw),
            Err(UsernameValidationError::TooLong { max: USERNAME_MAX })
        );
    }

    #[rstest]
    #[case("alice")]
    #[case("Катя")]
    #[case("bob smith")]
    fn accepts_opaque_identifiers(#[case] raw: &str) {
        let username = Username::new(raw).expect("valid username");
        assert_eq!(username.to_string(), raw);
    }

    #[rstest]
    fn deserialisation_validates() {
        let err = serde_json::from_str::<Username>("\"\"");
        assert!(err.is_err());
        let ok: Username = serde_json::from_str("\"alice\"").expect("valid");
        assert_eq!(ok.as_ref(), "alice");
    }
}
