//! Domain primitives, aggregates and services.
//!
//! Purpose: Define the strongly typed list-sharing model and the services
//! that keep lists and per-user access records consistent. Nothing here knows
//! about HTTP or a particular database.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic outcome payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable outcome identifier.
//! - List, ListId, ListName: the authoritative list record.
//! - AccessRecord, ListLink, LinkKind: the derived per-user index.
//! - ListCoordinator: multi-record create/delete/share/unshare/revoke.
//! - AccessQueryService: read-only access checks and listings.

pub mod access;
pub mod access_query;
pub mod auth;
pub mod consistency;
pub mod error;
pub mod list;
pub mod list_coordinator;
pub mod ports;
pub mod trace_id;
pub mod username;

pub use self::access::{AccessRecord, LinkKind, ListLink, SetMutation};
pub use self::access_query::AccessQueryService;
pub use self::auth::{Credentials, CredentialsValidationError};
pub use self::consistency::{Inconsistency, InconsistencyKind};
pub use self::error::{Error, ErrorCode};
pub use self::list::{LIST_NAME_MAX, List, ListId, ListName, ListValidationError};
pub use self::list_coordinator::{ListCoordinator, MAX_ID_ATTEMPTS};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::username::{USERNAME_MAX, Username, UsernameValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::access_denied("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
