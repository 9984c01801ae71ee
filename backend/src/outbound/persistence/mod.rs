//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the List Store and Access
//! Index Store ports backed by PostgreSQL via the Diesel ORM with async
//! support through `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Atomic set operations**: guest and link membership are rows, so every
//!   set append or remove is a single statement.
//! - **Bounded calls**: every port method, including pool checkout, runs under
//!   the pool's operation timeout and reports `Timeout` on expiry.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, PoolConfig, DieselListRepository};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/lists")).await?;
//! let lists = DieselListRepository::new(pool.clone());
//! ```

mod diesel_access_index_repository;
mod diesel_list_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_access_index_repository::DieselAccessIndexRepository;
pub use diesel_list_repository::DieselListRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DEFAULT_OPERATION_TIMEOUT, DbPool, PoolConfig, PoolError};
