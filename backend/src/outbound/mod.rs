//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **persistence**: PostgreSQL-backed stores using Diesel ORM
//! - **memory**: in-process stores for database-less runs and tests
//! - **consistency**: structured-log sink for inconsistency reports
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod consistency;
pub mod memory;
pub mod persistence;
