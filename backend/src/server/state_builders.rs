//! Builders wiring the list coordinator to its stores.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use thiserror::Error;
use tracing::{info, warn};

use backend::domain::ListCoordinator;
use backend::domain::ports::{
    AccessIndexRepository, ConsistencyMonitor, FixtureLoginService, ListRepository,
    UuidV7ListIdGenerator,
};
use backend::inbound::http::state::HttpState;
use backend::outbound::consistency::TracingConsistencyMonitor;
use backend::outbound::memory::{InMemoryAccessIndexRepository, InMemoryListRepository};
use backend::outbound::persistence::{
    DbPool, DieselAccessIndexRepository, DieselListRepository, MigrationError, PoolConfig,
    PoolError, run_pending_migrations,
};

use super::config::ServerSettings;

/// Failures while preparing the stores behind the HTTP state.
#[derive(Debug, Error)]
pub enum StateBuildError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Migrations(#[from] MigrationError),
}

fn coordinator_state<L, A>(lists: Arc<L>, index: Arc<A>) -> HttpState
where
    L: ListRepository + 'static,
    A: AccessIndexRepository + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let monitor: Arc<dyn ConsistencyMonitor> = Arc::new(TracingConsistencyMonitor);
    let coordinator = Arc::new(ListCoordinator::new(
        lists,
        index,
        Arc::new(UuidV7ListIdGenerator),
        clock,
        monitor,
    ));
    HttpState::from_coordinator(Arc::new(FixtureLoginService), coordinator)
}

/// Build the HTTP state, backed by PostgreSQL when a database URL is set and
/// by process memory otherwise.
///
/// # Errors
/// Returns [`StateBuildError`] when the pool cannot be built or migrations
/// fail to apply.
pub async fn build_http_state(settings: &ServerSettings) -> Result<HttpState, StateBuildError> {
    let Some(url) = settings.database_url.as_deref() else {
        warn!("no database configured; lists are kept in memory and lost on restart");
        return Ok(coordinator_state(
            Arc::new(InMemoryListRepository::new()),
            Arc::new(InMemoryAccessIndexRepository::new()),
        ));
    };

    if settings.run_migrations() {
        let applied = run_pending_migrations(url).await?;
        info!(applied, "database migrations applied");
    }

    let pool = DbPool::new(
        PoolConfig::new(url)
            .with_max_size(settings.pool_max_size())
            .with_operation_timeout(settings.store_timeout()),
    )
    .await?;
    Ok(coordinator_state(
        Arc::new(DieselListRepository::new(pool.clone())),
        Arc::new(DieselAccessIndexRepository::new(pool)),
    ))
}
