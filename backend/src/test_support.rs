//! Test utilities for the backend crate.
//!
//! Shared helpers for both unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for `cfg(test)` and with the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{ConsistencyMonitor, UuidV7ListIdGenerator};
use crate::domain::{Inconsistency, InconsistencyKind, ListCoordinator, Username};
use crate::outbound::memory::{InMemoryAccessIndexRepository, InMemoryListRepository};

/// Fixed instant used as the default "now" in tests.
pub fn fixture_timestamp() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single() {
        Some(instant) => instant,
        None => panic!("valid fixture timestamp"),
    }
}

/// Parse a username, panicking on invalid fixture input.
pub fn user(raw: &str) -> Username {
    match Username::new(raw) {
        Ok(username) => username,
        Err(error) => panic!("invalid fixture username {raw:?}: {error}"),
    }
}

/// Clock whose time only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Default for MutableClock {
    fn default() -> Self {
        Self::new(fixture_timestamp())
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Consistency monitor that keeps every report for later assertions.
#[derive(Default)]
pub struct RecordingConsistencyMonitor(Mutex<Vec<Inconsistency>>);

impl RecordingConsistencyMonitor {
    /// All reports received so far, oldest first.
    pub fn reports(&self) -> Vec<Inconsistency> {
        self.lock_reports().clone()
    }

    /// Kinds of all reports received so far, oldest first.
    pub fn kinds(&self) -> Vec<InconsistencyKind> {
        self.lock_reports().iter().map(|report| report.kind).collect()
    }

    fn lock_reports(&self) -> MutexGuard<'_, Vec<Inconsistency>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("monitor mutex"),
        }
    }
}

impl ConsistencyMonitor for RecordingConsistencyMonitor {
    fn report(&self, report: &Inconsistency) {
        self.lock_reports().push(report.clone());
    }
}

/// Coordinator type wired to the in-memory stores.
pub type InMemoryCoordinator =
    ListCoordinator<InMemoryListRepository, InMemoryAccessIndexRepository, UuidV7ListIdGenerator>;

/// A coordinator over fresh in-memory stores, with handles to inspect them.
pub struct InMemoryHarness {
    pub coordinator: Arc<InMemoryCoordinator>,
    pub lists: Arc<InMemoryListRepository>,
    pub index: Arc<InMemoryAccessIndexRepository>,
    pub clock: Arc<MutableClock>,
    pub monitor: Arc<RecordingConsistencyMonitor>,
}

impl InMemoryHarness {
    pub fn new() -> Self {
        let lists = Arc::new(InMemoryListRepository::new());
        let index = Arc::new(InMemoryAccessIndexRepository::new());
        let clock = Arc::new(MutableClock::default());
        let monitor = Arc::new(RecordingConsistencyMonitor::default());
        let coordinator = Arc::new(ListCoordinator::new(
            Arc::clone(&lists),
            Arc::clone(&index),
            Arc::new(UuidV7ListIdGenerator),
            clock.clone(),
            monitor.clone(),
        ));
        Self {
            coordinator,
            lists,
            index,
            clock,
            monitor,
        }
    }
}

impl Default for InMemoryHarness {
    fn default() -> Self {
        Self::new()
    }
}
