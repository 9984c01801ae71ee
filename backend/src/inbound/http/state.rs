//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccessRegistration, ListCommand, ListQuery, LoginService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn AccessRegistration>,
    pub lists: Arc<dyn ListCommand>,
    pub lists_query: Arc<dyn ListQuery>,
}

impl HttpState {
    /// Wire every list port to one service implementing all of them.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use backend::domain::ports::FixtureLoginService;
    /// use backend::inbound::http::state::HttpState;
    /// # fn wire<C>(coordinator: Arc<C>)
    /// # where
    /// #     C: backend::domain::ports::ListCommand
    /// #         + backend::domain::ports::ListQuery
    /// #         + backend::domain::ports::AccessRegistration
    /// #         + 'static,
    /// # {
    /// let state = HttpState::from_coordinator(Arc::new(FixtureLoginService), coordinator);
    /// let _lists = state.lists.clone();
    /// # }
    /// ```
    pub fn from_coordinator<C>(login: Arc<dyn LoginService>, coordinator: Arc<C>) -> Self
    where
        C: ListCommand + ListQuery + AccessRegistration + 'static,
    {
        Self {
            login,
            registration: coordinator.clone(),
            lists: coordinator.clone(),
            lists_query: coordinator,
        }
    }
}
