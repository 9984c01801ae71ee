//! Driving port creating the per-user access record at sign-up.

use async_trait::async_trait;

use crate::domain::{Error, Username};

/// Domain use-case port for registering users with the access index.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessRegistration: Send + Sync {
    /// Create an empty access record for `username`.
    ///
    /// Fails with `already_exists` when the user is already registered.
    async fn register_user(&self, username: &Username) -> Result<(), Error>;
}
