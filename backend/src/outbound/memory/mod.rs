//! In-process store adapters.
//!
//! Each store keeps its documents in one `Mutex<HashMap<..>>` and every port
//! method takes that lock exactly once, so every operation is atomic per
//! document, matching what the PostgreSQL adapters guarantee per row set.
//! Used when no database is configured and throughout the test suites.

mod access_index_repository;
mod list_repository;

pub use access_index_repository::InMemoryAccessIndexRepository;
pub use list_repository::InMemoryListRepository;

/// Message reported when a store mutex was poisoned by a panicking holder.
const POISONED: &str = "in-memory store lock poisoned";
