//! Cascade deactivation of connections when a server becomes inactive.

use crate::connection::{
    domain::ConnectionId,
    ports::{ConnectionRepository, ConnectionRepositoryError, ConnectionRepositoryResult},
};
use crate::server::{
    domain::ServerRef,
    ports::{CascadeError, CascadeFailure, CascadeReport, DeactivationCascade},
};
use crate::store::StoreBudget;
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Attempts made per connection before the cascade gives up on it.
pub const DEFAULT_CASCADE_ATTEMPTS: u32 = 3;

/// Deactivates the active connections of a server that became inactive.
///
/// Each connection is written with a conditional `active -> inactive`
/// update, retried immediately up to the configured number of attempts. A
/// connection that keeps failing does not stop the others; completed writes
/// are never rolled back.
pub struct CascadeCoordinator<CR, C>
where
    CR: ConnectionRepository,
    C: Clock + Send + Sync,
{
    connections: Arc<CR>,
    clock: Arc<C>,
    budget: StoreBudget,
    max_attempts: u32,
}

impl<CR, C> CascadeCoordinator<CR, C>
where
    CR: ConnectionRepository,
    C: Clock + Send + Sync,
{
    /// Creates a coordinator with the default attempt count and store
    /// budget.
    #[must_use]
    pub fn new(connections: Arc<CR>, clock: Arc<C>) -> Self {
        Self {
            connections,
            clock,
            budget: StoreBudget::default(),
            max_attempts: DEFAULT_CASCADE_ATTEMPTS,
        }
    }

    /// Sets the attempts made per connection. Zero is treated as one.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Replaces the time budget applied to each store interaction.
    #[must_use]
    pub const fn with_budget(mut self, budget: StoreBudget) -> Self {
        self.budget = budget;
        self
    }

    async fn deactivate_with_retry(&self, id: ConnectionId) -> ConnectionRepositoryResult<bool> {
        let mut attempt = 1;
        loop {
            let at = self.clock.utc();
            match self
                .budget
                .run(self.connections.deactivate_if_active(id, at))
                .await
            {
                Ok(changed) => return Ok(changed),
                Err(err @ ConnectionRepositoryError::NotFound(_)) => return Err(err),
                Err(err) if attempt < self.max_attempts => {
                    warn!(
                        connection_id = %id,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "cascade deactivation failed, retrying"
                    );
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl<CR, C> DeactivationCascade for CascadeCoordinator<CR, C>
where
    CR: ConnectionRepository,
    C: Clock + Send + Sync,
{
    async fn deactivate_dependents(&self, server: ServerRef) -> Result<CascadeReport, CascadeError> {
        let dependents = self
            .budget
            .run(self.connections.find_by_server(server))
            .await
            .map_err(|err| CascadeError::Lookup {
                server,
                source: Arc::new(err),
            })?;

        let mut deactivated = Vec::new();
        let mut failed = Vec::new();
        for connection in dependents.iter().filter(|c| c.status().is_active()) {
            let id = connection.id();
            match self.deactivate_with_retry(id).await {
                Ok(true) => deactivated.push(id.into_inner()),
                Ok(false) => debug!(connection_id = %id, "connection already inactive"),
                Err(err) => failed.push(CascadeFailure {
                    record_id: id.into_inner(),
                    error: Arc::new(err),
                }),
            }
        }

        if failed.is_empty() {
            info!(
                %server,
                examined = dependents.len(),
                deactivated = deactivated.len(),
                "connection cascade complete"
            );
            return Ok(CascadeReport {
                server,
                examined: dependents.len(),
                deactivated,
            });
        }

        warn!(
            %server,
            deactivated = deactivated.len(),
            failed = failed.len(),
            "connection cascade incomplete"
        );
        Err(CascadeError::Partial {
            server,
            deactivated,
            failed,
        })
    }
}
