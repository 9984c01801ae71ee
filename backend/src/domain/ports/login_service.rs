//! Driving port for login and registration use-cases.
//!
//! Credential storage and password verification are external collaborators.
//! Inbound adapters call this port to turn credentials into an authenticated
//! [`Username`] without importing the backing infrastructure.

use async_trait::async_trait;

use crate::domain::{Credentials, Error, Username};

/// Development password accepted by [`FixtureLoginService`].
pub const FIXTURE_PASSWORD: &str = "password";

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user.
    async fn authenticate(&self, credentials: &Credentials) -> Result<Username, Error>;

    /// Store credentials for a new user and return the registered username.
    async fn register(&self, credentials: &Credentials) -> Result<Username, Error>;
}

/// Stand-in authenticator used when no credential backend is configured.
///
/// Any well-formed username authenticates with [`FIXTURE_PASSWORD`].
/// Registration accepts only that password so a freshly registered user can
/// log in again.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

impl FixtureLoginService {
    fn check(credentials: &Credentials) -> Result<Username, Error> {
        if credentials.password() == FIXTURE_PASSWORD {
            Ok(credentials.username().clone())
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Username, Error> {
        Self::check(credentials)
    }

    async fn register(&self, credentials: &Credentials) -> Result<Username, Error> {
        Self::check(credentials)
    }
}
