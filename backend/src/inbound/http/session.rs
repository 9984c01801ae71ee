//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie session stores only the authenticated username. Handlers ask
//! for it through [`SessionContext::require_user`] and pass it to domain
//! ports as the trusted requester identity.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, Username};

pub(crate) const USERNAME_KEY: &str = "username";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated username in the session cookie.
    ///
    /// The session identifier is renewed so a pre-login cookie cannot be
    /// reused after authentication.
    pub fn persist_user(&self, username: &Username) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USERNAME_KEY, username.as_ref())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current username from the session, if present and valid.
    pub fn user(&self) -> Result<Option<Username>, Error> {
        let raw = self
            .0
            .get::<String>(USERNAME_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|raw| match Username::new(raw) {
            Ok(username) => Some(username),
            Err(error) => {
                warn!(%error, "invalid username in session cookie");
                None
            }
        }))
    }

    /// Require an authenticated username or return `401 Unauthorized`.
    pub fn require_user(&self) -> Result<Username, Error> {
        self.user()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
