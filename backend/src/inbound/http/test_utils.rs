//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;

use crate::domain::ports::FixtureLoginService;
use crate::inbound::http::state::HttpState;
use crate::test_support::InMemoryHarness;

/// Build a session middleware configured for tests.
///
/// Generates a fresh key per invocation and disables the `Secure` flag for
/// local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The session cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(|cookie| cookie.into_owned())
        .expect("session cookie set")
}

/// HTTP state over fresh in-memory stores and the fixture login service.
pub fn in_memory_state() -> (HttpState, InMemoryHarness) {
    let harness = InMemoryHarness::new();
    let state = HttpState::from_coordinator(
        Arc::new(FixtureLoginService),
        Arc::clone(&harness.coordinator),
    );
    (state, harness)
}
