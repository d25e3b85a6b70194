//! Composition root.
//!
//! Builds each repository once and injects it into the services that need
//! it. The server registries share one cascade coordinator, which writes
//! through the same connection repository as the connection manager.

use crate::config::Config;
use crate::connection::{
    adapters::{
        keys::OsRngKeyGenerator, memory::InMemoryConnectionRepository,
        postgres::PostgresConnectionRepository,
    },
    ports::{ApiKeyGenerator, ConnectionRepository},
    services::{CascadeCoordinator, ConnectionManager},
};
use crate::pagination::PageRequest;
use crate::server::{
    adapters::{memory::InMemoryServerRepository, postgres::PostgresServerRepository},
    domain::{UserDelivery, Webview},
    ports::ServerRepository,
    services::ServerRegistryService,
};
use crate::store::{PgPool, StatementTimeout};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager as PoolManager, Pool, PoolError};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;
use thiserror::Error;

/// Registry for servers of kind `K` wired to the connection cascade.
pub type ServerRegistry<K, R, CR, C> = ServerRegistryService<K, R, CascadeCoordinator<CR, C>, C>;

/// Services backed by in-memory stores.
pub type InMemoryRegistry = Registry<
    InMemoryConnectionRepository,
    InMemoryServerRepository<Webview>,
    InMemoryServerRepository<UserDelivery>,
>;

/// Services backed by `PostgreSQL`.
pub type PostgresRegistry = Registry<
    PostgresConnectionRepository,
    PostgresServerRepository<Webview>,
    PostgresServerRepository<UserDelivery>,
>;

/// Errors raised while wiring services.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// `store.database_url` is required for the `PostgreSQL` adapters.
    #[error("store.database_url is not configured")]
    MissingDatabaseUrl,
    /// The connection pool could not be created.
    #[error("failed to build PostgreSQL pool: {0}")]
    Pool(#[from] PoolError),
}

/// The wired services.
pub struct Registry<CR, WR, UR, G = OsRngKeyGenerator, C = DefaultClock>
where
    CR: ConnectionRepository,
    WR: ServerRepository<Webview>,
    UR: ServerRepository<UserDelivery>,
    G: ApiKeyGenerator,
    C: Clock + Send + Sync,
{
    /// Webview server registration and status.
    pub webview_servers: ServerRegistry<Webview, WR, CR, C>,
    /// User-delivery server registration and status.
    pub user_delivery_servers: ServerRegistry<UserDelivery, UR, CR, C>,
    /// Connection lifecycle.
    pub connections: ConnectionManager<CR, WR, UR, G, C>,
    default_limit: u32,
}

impl<CR, WR, UR, G, C> Registry<CR, WR, UR, G, C>
where
    CR: ConnectionRepository,
    WR: ServerRepository<Webview>,
    UR: ServerRepository<UserDelivery>,
    G: ApiKeyGenerator,
    C: Clock + Send + Sync,
{
    /// Wires services around the given repositories.
    #[must_use]
    pub fn wire(
        connections: Arc<CR>,
        webview_servers: Arc<WR>,
        user_delivery_servers: Arc<UR>,
        keys: Arc<G>,
        clock: Arc<C>,
        config: &Config,
    ) -> Self {
        let budget = config.store_budget();
        let cascade = Arc::new(
            CascadeCoordinator::new(Arc::clone(&connections), Arc::clone(&clock))
                .with_budget(budget)
                .with_max_attempts(config.connection.cascade_max_attempts),
        );

        Self {
            webview_servers: ServerRegistryService::new(
                Arc::clone(&webview_servers),
                Arc::clone(&cascade),
                Arc::clone(&clock),
            )
            .with_budget(budget),
            user_delivery_servers: ServerRegistryService::new(
                Arc::clone(&user_delivery_servers),
                cascade,
                Arc::clone(&clock),
            )
            .with_budget(budget),
            connections: ConnectionManager::new(
                connections,
                webview_servers,
                user_delivery_servers,
                keys,
                clock,
            )
            .with_budget(budget)
            .with_api_key_bytes(config.connection.api_key_bytes),
            default_limit: config.pagination.default_limit,
        }
    }

    /// Interprets raw `limit` and `page` values with the configured default
    /// page size.
    #[must_use]
    pub fn page_request(&self, raw_limit: Option<&str>, raw_page: Option<&str>) -> PageRequest {
        PageRequest::parse_with_default(raw_limit, raw_page, self.default_limit)
    }
}

impl InMemoryRegistry {
    /// Wires services around fresh in-memory stores.
    #[must_use]
    pub fn in_memory(config: &Config) -> Self {
        Self::wire(
            Arc::new(InMemoryConnectionRepository::new()),
            Arc::new(InMemoryServerRepository::new()),
            Arc::new(InMemoryServerRepository::new()),
            Arc::new(OsRngKeyGenerator::new()),
            Arc::new(DefaultClock),
            config,
        )
    }
}

impl PostgresRegistry {
    /// Wires services around a `PostgreSQL` pool built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::MissingDatabaseUrl`] when no URL is
    /// configured and [`BootstrapError::Pool`] when the pool cannot be
    /// created.
    pub fn postgres(config: &Config) -> Result<Self, BootstrapError> {
        let url = config
            .store
            .database_url
            .as_deref()
            .ok_or(BootstrapError::MissingDatabaseUrl)?;
        let limit = config.store_budget().limit();
        let pool: PgPool = Pool::builder()
            .max_size(config.store.max_connections)
            .connection_timeout(limit)
            .connection_customizer(Box::new(StatementTimeout::new(limit)))
            .build(PoolManager::<PgConnection>::new(url))?;

        Ok(Self::wire(
            Arc::new(PostgresConnectionRepository::new(pool.clone())),
            Arc::new(PostgresServerRepository::new(pool.clone())),
            Arc::new(PostgresServerRepository::new(pool)),
            Arc::new(OsRngKeyGenerator::new()),
            Arc::new(DefaultClock),
            config,
        ))
    }
}
