//! Per-user access index derived from list records.
//!
//! An [`AccessRecord`] lists the lists a user owns and the lists shared with
//! them. It is a denormalised index: the [`List`](super::List) stays the
//! source of truth and the coordinator keeps records eventually consistent.
//!
//! ## Invariants
//! - A list id appears in at most one of a user's two link-sets.
//! - Each link-set holds a list id at most once, in insertion order.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{List, ListId, ListName, Username};

/// Denormalised `(id, display name)` pointer used for fast listing.
///
/// The name is captured when the link is written and is not refreshed later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListLink {
    pub id: ListId,
    pub display_name: ListName,
}

impl ListLink {
    /// Construct a link.
    pub fn new(id: ListId, display_name: ListName) -> Self {
        Self { id, display_name }
    }

    /// Project a list into a link carrying its current name.
    pub fn for_list(list: &List) -> Self {
        Self::new(list.id, list.name.clone())
    }
}

/// The two link-sets held by an access record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Owned,
    Shared,
}

impl LinkKind {
    /// Storage label for the link-set.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owned => "owned",
            Self::Shared => "shared",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owned" => Ok(Self::Owned),
            "shared" => Ok(Self::Shared),
            other => Err(format!("unknown link kind: {other}")),
        }
    }
}

/// Per-user index of owned and shared lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessRecord {
    pub username: Username,
    pub owned: Vec<ListLink>,
    pub shared: Vec<ListLink>,
}

impl AccessRecord {
    /// An empty record, as created at registration.
    pub fn empty(username: Username) -> Self {
        Self {
            username,
            owned: Vec::new(),
            shared: Vec::new(),
        }
    }

    /// Which link-set holds `id`, if any.
    ///
    /// Owned wins if a corrupted record holds the id in both sets.
    pub fn link_kind(&self, id: &ListId) -> Option<LinkKind> {
        if self.owned.iter().any(|link| &link.id == id) {
            Some(LinkKind::Owned)
        } else if self.shared.iter().any(|link| &link.id == id) {
            Some(LinkKind::Shared)
        } else {
            None
        }
    }

    /// Whether either link-set references `id`.
    pub fn references(&self, id: &ListId) -> bool {
        self.link_kind(id).is_some()
    }

    /// The link-set for `kind`.
    pub fn links(&self, kind: LinkKind) -> &[ListLink] {
        match kind {
            LinkKind::Owned => &self.owned,
            LinkKind::Shared => &self.shared,
        }
    }
}

/// Outcome of an atomic append/remove on one document's set-valued field.
///
/// Keeps "zero records affected" distinct from store failures, which travel
/// through the adapter error type instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetMutation {
    /// The document changed.
    Applied,
    /// The element was already present (append) or absent (remove).
    Unchanged,
    /// The target document does not exist.
    MissingRecord,
}

impl SetMutation {
    /// Whether the target document existed.
    pub fn found_record(self) -> bool {
        !matches!(self, Self::MissingRecord)
    }
}
