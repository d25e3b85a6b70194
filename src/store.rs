//! Shared store plumbing: the per-operation time budget and the
//! `PostgreSQL` pool type used by every Diesel adapter.

use diesel::RunQueryDsl;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// `PostgreSQL` connection pool type shared by the Diesel adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Default time allowed for a single store interaction.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// A store interaction did not complete within its budget.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("store operation exceeded its {0:?} budget")]
pub struct BudgetExceeded(pub Duration);

/// Upper bound on the time a service waits for one store interaction.
///
/// Expiry drops the pending future and reports [`BudgetExceeded`] through
/// the caller's error type. Nothing is retried. Blocking work already
/// handed to the store is not interrupted here; for `PostgreSQL` see
/// [`StatementTimeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreBudget {
    limit: Duration,
}

impl StoreBudget {
    /// Creates a budget with the given limit.
    #[must_use]
    pub const fn new(limit: Duration) -> Self {
        Self { limit }
    }

    /// Returns the configured limit.
    #[must_use]
    pub const fn limit(self) -> Duration {
        self.limit
    }

    /// Runs a store operation within the budget.
    ///
    /// # Errors
    ///
    /// Returns the operation's own error, or `E::from(BudgetExceeded)` when
    /// the limit elapses first.
    pub async fn run<F, T, E>(self, operation: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<BudgetExceeded>,
    {
        tokio::time::timeout(self.limit, operation)
            .await
            .unwrap_or_else(|_| Err(BudgetExceeded(self.limit).into()))
    }
}

impl Default for StoreBudget {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_TIMEOUT)
    }
}

/// Pool hook that sets `statement_timeout` on every connection it hands
/// out, so `PostgreSQL` cancels a statement once its budget has passed.
///
/// [`StoreBudget::run`] stops waiting at the limit, but the blocking task
/// holding the connection keeps running until the server answers. With
/// this hook the server gives up too. The statement clock starts only once
/// a pooled connection is in hand, so a statement can still outlive the
/// caller by the time spent waiting for the pool, and an adapter issuing
/// several statements grants each one the full limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementTimeout {
    limit: Duration,
}

impl StatementTimeout {
    /// Creates a hook enforcing `limit` on each statement.
    #[must_use]
    pub const fn new(limit: Duration) -> Self {
        Self { limit }
    }

    /// `SET` statement issued on acquire. Sub-millisecond limits round up,
    /// since zero would disable the timeout.
    fn statement(self) -> String {
        format!("SET statement_timeout = {}", self.limit.as_millis().max(1))
    }
}

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for StatementTimeout {
    fn on_acquire(&self, connection: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        diesel::sql_query(self.statement())
            .execute(connection)
            .map(drop)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}
