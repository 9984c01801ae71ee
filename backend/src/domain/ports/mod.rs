//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports ([`ListRepository`], [`AccessIndexRepository`],
//! [`ListIdGenerator`], [`ConsistencyMonitor`]) are implemented by outbound
//! adapters. Driving ports ([`ListCommand`], [`ListQuery`],
//! [`AccessRegistration`], [`LoginService`]) are called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod access_index_repository;
mod access_registration;
mod consistency_monitor;
mod list_command;
mod list_id_generator;
mod list_query;
mod list_repository;
mod login_service;

#[cfg(test)]
pub use access_index_repository::MockAccessIndexRepository;
pub use access_index_repository::{AccessIndexRepository, AccessIndexRepositoryError};
#[cfg(test)]
pub use access_registration::MockAccessRegistration;
pub use access_registration::AccessRegistration;
#[cfg(test)]
pub use consistency_monitor::MockConsistencyMonitor;
pub use consistency_monitor::{ConsistencyMonitor, NoOpConsistencyMonitor};
#[cfg(test)]
pub use list_command::MockListCommand;
pub use list_command::{CreateListRequest, ListCommand};
#[cfg(test)]
pub use list_id_generator::MockListIdGenerator;
pub use list_id_generator::{ListIdGenerator, UuidV7ListIdGenerator};
#[cfg(test)]
pub use list_query::MockListQuery;
pub use list_query::ListQuery;
#[cfg(test)]
pub use list_repository::MockListRepository;
pub use list_repository::{ListRepository, ListRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FIXTURE_PASSWORD, FixtureLoginService, LoginService};
