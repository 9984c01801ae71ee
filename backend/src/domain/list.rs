//! List aggregate: the source of truth for content and guest membership.
//!
//! ## Invariants
//! - Exactly one owner.
//! - `guests` holds no duplicates and never contains the owner.
//! - The identifier is immutable once generated.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Username;

/// Maximum accepted display name length in characters.
pub const LIST_NAME_MAX: usize = 128;

/// Validation errors for list identifiers and names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListValidationError {
    InvalidId,
    EmptyName,
    NameTooLong { max: usize },
}

impl fmt::Display for ListValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "list id must be a canonical UUID"),
            Self::EmptyName => write!(f, "list name must not be empty"),
            Self::NameTooLong { max } => write!(f, "list name must be at most {max} characters"),
        }
    }
}

impl std::error::Error for ListValidationError {}

/// Globally unique, lexicographically sortable list identifier.
///
/// Backed by a UUIDv7, whose leading bits are a millisecond timestamp, so the
/// canonical lower-case string sorts by creation time.
///
/// # Examples
/// ```
/// use backend::domain::ListId;
///
/// let first = ListId::generate();
/// let parsed: ListId = first.to_string().parse().expect("round trip");
/// assert_eq!(first, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "01890a5d-ac96-774b-bcce-b302099a8057")]
pub struct ListId(Uuid);

impl ListId {
    /// Generate a new time-ordered identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for ListId {
    type Err = ListValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = Uuid::try_parse(s).map_err(|_| ListValidationError::InvalidId)?;
        // Only the canonical form is accepted so string comparisons stay exact.
        if parsed.hyphenated().to_string() != s {
            return Err(ListValidationError::InvalidId);
        }
        Ok(Self(parsed))
    }
}

impl From<ListId> for String {
    fn from(value: ListId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ListId {
    type Error = ListValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Display name shown in list overviews.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Groceries")]
pub struct ListName(String);

impl ListName {
    /// Validate and construct a display name. Surrounding whitespace is trimmed.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ListValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ListValidationError::EmptyName);
        }
        if trimmed.chars().count() > LIST_NAME_MAX {
            return Err(ListValidationError::NameTooLong { max: LIST_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ListName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ListName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ListName> for String {
    fn from(value: ListName) -> Self {
        value.0
    }
}

impl TryFrom<String> for ListName {
    type Error = ListValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A named, owned, content-bearing shareable list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: ListId,
    pub owner: Username,
    /// Guests in the order they were added.
    pub guests: Vec<Username>,
    pub name: ListName,
    pub content: String,
    pub last_changed: DateTime<Utc>,
}

impl List {
    /// A freshly created list with no guests.
    pub fn new(
        id: ListId,
        owner: Username,
        name: ListName,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            guests: Vec::new(),
            name,
            content: content.into(),
            last_changed: created_at,
        }
    }

    /// Whether `username` owns this list.
    pub fn is_owner(&self, username: &Username) -> bool {
        &self.owner == username
    }

    /// Whether `username` is a guest of this list.
    pub fn is_guest(&self, username: &Username) -> bool {
        self.guests.contains(username)
    }

    /// Whether `username` may read or edit this list.
    pub fn grants_access_to(&self, username: &Username) -> bool {
        self.is_owner(username) || self.is_guest(username)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn username(raw: &str) -> Username {
        Username::new(raw).expect("valid username")
    }

    #[rstest]
    fn generated_ids_sort_by_creation() {
        let ids: Vec<ListId> = (0..16).map(|_| ListId::generate()).collect();
        let mut sorted = ids.clone();
        sorted.sort_by_key(ToString::to_string);
        assert_eq!(ids, sorted);
    }

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    #[case("01890A5D-AC96-774B-BCCE-B302099A8057")]
    #[case("01890a5dac96774bbcceb302099a8057")]
    fn rejects_non_canonical_ids(#[case] raw: &str) {
        assert_eq!(raw.parse::<ListId>(), Err(ListValidationError::InvalidId));
    }

    #[rstest]
    fn names_are_trimmed() {
        let name = ListName::new("  Groceries ").expect("valid name");
        assert_eq!(name.as_ref(), "Groceries");
    }

    #[rstest]
    #[case("", ListValidationError::EmptyName)]
    #[case("   ", ListValidationError::EmptyName)]
    fn rejects_blank_names(#[case] raw: &str, #[case] expected: ListValidationError) {
        assert_eq!(ListName::new(raw), Err(expected));
    }

    #[rstest]
    fn rejects_overlong_names() {
        let raw = "x".repeat(LIST_NAME_MAX + 1);
        assert_eq!(
            ListName::new(raw),
            Err(ListValidationError::NameTooLong { max: LIST_NAME_MAX })
        );
    }

    #[rstest]
    fn access_follows_owner_and_guests() {
        let mut list = List::new(
            ListId::generate(),
            username("alice"),
            ListName::new("Groceries").expect("name"),
            "milk",
            Utc::now(),
        );
        list.guests.push(username("bob"));

        assert!(list.grants_access_to(&username("alice")));
        assert!(list.grants_access_to(&username("bob")));
        assert!(!list.grants_access_to(&username("carol")));
        assert!(!list.is_guest(&username("alice")));
    }
}
