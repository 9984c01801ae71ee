//! Login and registration credentials.
//!
//! Credential verification and storage live behind the
//! [`LoginService`](super::ports::LoginService) port. This module only shapes
//! inbound values so handlers hand the port a validated [`Username`].

use std::fmt;

use zeroize::Zeroizing;

use super::{Username, UsernameValidationError};

/// Validation failures for credential payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Username was blank or otherwise malformed.
    Username(UsernameValidationError),
    /// Password was empty.
    EmptyPassword,
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username(err) => write!(f, "{err}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// Validated credentials.
///
/// ## Invariants
/// - `username` is trimmed and satisfies [`Username`] validation.
/// - `password` is non-empty and otherwise kept verbatim; it is zeroed on drop.
///
/// # Examples
/// ```
/// use backend::domain::Credentials;
///
/// let creds = Credentials::try_from_parts(" alice ", "password").unwrap();
/// assert_eq!(creds.username().as_ref(), "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    username: Username,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let username =
            Username::new(username.trim()).map_err(CredentialsValidationError::Username)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// The claimed principal.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Password as supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
