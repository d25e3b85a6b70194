//! Service layer for connection creation, listing, and status changes.
//!
//! [`ConnectionManager`] reads both server repositories directly rather than
//! going through
//! [`ServerRegistryService::get`](crate::server::services::ServerRegistryService::get)
//! to check that referenced servers exist and, on activation, that both are
//! active.

use crate::connection::{
    domain::{
        Connection, ConnectionDomainError, ConnectionId, ConnectionPair, DEFAULT_API_KEY_BYTES,
        NewConnection, WebhookUrl,
    },
    ports::{
        ApiKeyGenerator, ConnectionFilter, ConnectionRepository, ConnectionRepositoryError,
    },
};
use crate::envelope::{Classify, ErrorClass};
use crate::pagination::{Page, PageRequest};
use crate::server::{
    domain::{Server, ServerId, ServerKind, ServerRef, ServerSummary, UserDelivery, Webview},
    ports::{ServerRepository, ServerRepositoryError},
};
use crate::status::{ParseStatusError, Status};
use crate::store::StoreBudget;
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request payload for creating a connection.
///
/// Identifiers and the webhook arrive as text and are validated by
/// [`ConnectionManager::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateConnectionRequest {
    user_delivery_server_id: String,
    webview_server_id: Option<String>,
    webhook_url: Option<String>,
}

impl CreateConnectionRequest {
    /// Creates a request for the given user-delivery server.
    #[must_use]
    pub fn new(user_delivery_server_id: impl Into<String>) -> Self {
        Self {
            user_delivery_server_id: user_delivery_server_id.into(),
            webview_server_id: None,
            webhook_url: None,
        }
    }

    /// Sets the webview server to pair with.
    #[must_use]
    pub fn with_webview_server_id(mut self, id: impl Into<String>) -> Self {
        self.webview_server_id = Some(id.into());
        self
    }

    /// Sets the user-delivery webhook. A blank value means no webhook.
    #[must_use]
    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }
}

/// Listing query for the connections of one user-delivery server.
///
/// The webview filter and status filter are raw text; values that do not
/// parse are ignored rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionListQuery {
    user_delivery_server_id: ServerId<UserDelivery>,
    webview_server_id: Option<String>,
    status: Option<String>,
    page: PageRequest,
}

impl ConnectionListQuery {
    /// Creates an unfiltered query for a user-delivery server.
    #[must_use]
    pub const fn new(user_delivery_server_id: ServerId<UserDelivery>, page: PageRequest) -> Self {
        Self {
            user_delivery_server_id,
            webview_server_id: None,
            status: None,
            page,
        }
    }

    /// Restricts results to one webview server.
    #[must_use]
    pub fn with_webview_server_id(mut self, id: impl Into<String>) -> Self {
        self.webview_server_id = Some(id.into());
        self
    }

    /// Restricts results to the given status text.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    fn into_parts(self) -> (ConnectionFilter, PageRequest) {
        let filter = ConnectionFilter {
            user_delivery_server_id: self.user_delivery_server_id,
            webview_server_id: self
                .webview_server_id
                .as_deref()
                .and_then(|raw| raw.parse().ok()),
            status: Status::filter(self.status.as_deref()),
        };
        (filter, self.page)
    }
}

/// Connection enriched with `{id, name}` projections of both servers.
///
/// A server that cannot be resolved is rendered as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionView {
    /// The listed connection.
    #[serde(flatten)]
    pub connection: Connection,
    /// Webview side of the pair.
    pub webview_server: Option<ServerSummary<Webview>>,
    /// User-delivery side of the pair.
    pub user_delivery_server: Option<ServerSummary<UserDelivery>>,
}

/// Service-level errors for connection operations.
#[derive(Debug, Error)]
pub enum ConnectionServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ConnectionDomainError),
    /// The requested status is not recognised.
    #[error(transparent)]
    Status(#[from] ParseStatusError),
    /// Connection repository operation failed.
    #[error(transparent)]
    Repository(#[from] ConnectionRepositoryError),
    /// A server lookup failed in the store.
    #[error(transparent)]
    ServerLookup(#[from] ServerRepositoryError),
    /// A referenced server does not exist.
    #[error("{0} not found")]
    ServerNotFound(ServerRef),
    /// Activation requires the referenced server to be active.
    #[error("{0} is not active")]
    ServerNotActive(ServerRef),
}

impl Classify for ConnectionServiceError {
    fn classify(&self) -> ErrorClass {
        match self {
            Self::Domain(_) | Self::Status(_) => ErrorClass::Validation,
            Self::Repository(err) => err.classify(),
            Self::ServerLookup(err) => err.classify(),
            Self::ServerNotFound(_) => ErrorClass::NotFound,
            Self::ServerNotActive(_) => ErrorClass::Precondition,
        }
    }
}

/// Result type for connection service operations.
pub type ConnectionServiceResult<T> = Result<T, ConnectionServiceError>;

/// Connection lifecycle orchestration service.
pub struct ConnectionManager<CR, WR, UR, G, C>
where
    CR: ConnectionRepository,
    WR: ServerRepository<Webview>,
    UR: ServerRepository<UserDelivery>,
    G: ApiKeyGenerator,
    C: Clock + Send + Sync,
{
    connections: Arc<CR>,
    webview_servers: Arc<WR>,
    user_delivery_servers: Arc<UR>,
    keys: Arc<G>,
    clock: Arc<C>,
    budget: StoreBudget,
    api_key_bytes: usize,
}

impl<CR, WR, UR, G, C> Clone for ConnectionManager<CR, WR, UR, G, C>
where
    CR: ConnectionRepository,
    WR: ServerRepository<Webview>,
    UR: ServerRepository<UserDelivery>,
    G: ApiKeyGenerator,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            connections: Arc::clone(&self.connections),
            webview_servers: Arc::clone(&self.webview_servers),
            user_delivery_servers: Arc::clone(&self.user_delivery_servers),
            keys: Arc::clone(&self.keys),
            clock: Arc::clone(&self.clock),
            budget: self.budget,
            api_key_bytes: self.api_key_bytes,
        }
    }
}

impl<CR, WR, UR, G, C> ConnectionManager<CR, WR, UR, G, C>
where
    CR: ConnectionRepository,
    WR: ServerRepository<Webview>,
    UR: ServerRepository<UserDelivery>,
    G: ApiKeyGenerator,
    C: Clock + Send + Sync,
{
    /// Creates a new connection manager with default key length and store
    /// budget.
    #[must_use]
    pub fn new(
        connections: Arc<CR>,
        webview_servers: Arc<WR>,
        user_delivery_servers: Arc<UR>,
        keys: Arc<G>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            connections,
            webview_servers,
            user_delivery_servers,
            keys,
            clock,
            budget: StoreBudget::default(),
            api_key_bytes: DEFAULT_API_KEY_BYTES,
        }
    }

    /// Replaces the time budget applied to each store interaction.
    #[must_use]
    pub const fn with_budget(mut self, budget: StoreBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Sets the number of random bytes behind each issued key.
    #[must_use]
    pub const fn with_api_key_bytes(mut self, bytes: usize) -> Self {
        self.api_key_bytes = bytes;
        self
    }

    /// Creates an inactive connection between two existing servers and
    /// issues its API keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionServiceError::Domain`] when an identifier is
    /// missing or malformed or the webhook is invalid,
    /// [`ConnectionServiceError::ServerNotFound`] when either server does
    /// not exist, and [`ConnectionServiceError::Repository`] when the pair is
    /// already connected or persistence fails.
    pub async fn create(
        &self,
        request: CreateConnectionRequest,
    ) -> ConnectionServiceResult<Connection> {
        let CreateConnectionRequest {
            user_delivery_server_id,
            webview_server_id,
            webhook_url,
        } = request;

        let webview_id: ServerId<Webview> = webview_server_id
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .ok_or(ConnectionDomainError::MissingWebviewServerId)?
            .parse()
            .map_err(ConnectionDomainError::from)?;
        let user_delivery_id: ServerId<UserDelivery> = user_delivery_server_id
            .parse()
            .map_err(ConnectionDomainError::from)?;
        let webhook = WebhookUrl::parse_optional(webhook_url.as_deref())?;

        self.load_server(&*self.user_delivery_servers, user_delivery_id)
            .await?;
        self.load_server(&*self.webview_servers, webview_id).await?;

        let connection = Connection::new(
            NewConnection {
                pair: ConnectionPair::new(webview_id, user_delivery_id),
                webview_server_api_key: self.keys.generate(self.api_key_bytes),
                user_delivery_server_api_key: self.keys.generate(self.api_key_bytes),
                webhook_url: webhook,
            },
            &*self.clock,
        );
        self.budget.run(self.connections.insert(&connection)).await?;
        info!(
            connection_id = %connection.id(),
            webview_server_id = %webview_id,
            user_delivery_server_id = %user_delivery_id,
            "connection created"
        );
        Ok(connection)
    }

    /// Returns one page of a user-delivery server's connections with both
    /// server projections, plus the total number of matches.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionServiceError::ServerNotFound`] when the
    /// user-delivery server does not exist, or a repository error when
    /// persistence lookup fails.
    pub async fn list(
        &self,
        query: ConnectionListQuery,
    ) -> ConnectionServiceResult<Page<ConnectionView>> {
        let (filter, page) = query.into_parts();
        let user_delivery = self
            .load_server(&*self.user_delivery_servers, filter.user_delivery_server_id)
            .await?;
        let user_delivery_summary = user_delivery.summary();

        let matching = self.budget.run(self.connections.list(&filter, page)).await?;
        let total = matching.total();

        let mut views = Vec::with_capacity(matching.items().len());
        for connection in matching.into_items() {
            let webview_server = self.webview_summary(connection.webview_server_id()).await;
            views.push(ConnectionView {
                connection,
                webview_server,
                user_delivery_server: Some(user_delivery_summary.clone()),
            });
        }

        Ok(Page::new(views, page, total))
    }

    /// Returns the connection with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionServiceError::Repository`] with
    /// [`ConnectionRepositoryError::NotFound`] when the connection does not
    /// exist.
    pub async fn get(&self, id: ConnectionId) -> ConnectionServiceResult<Connection> {
        self.find_by_id_or_error(id).await
    }

    /// Replaces a connection's webhook. Setting the current webhook is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionServiceError::Repository`] when the connection
    /// does not exist or persistence fails, and
    /// [`ConnectionServiceError::Domain`] when `url` is not an absolute URL.
    pub async fn update_webhook_url(
        &self,
        id: ConnectionId,
        url: &str,
    ) -> ConnectionServiceResult<Connection> {
        let mut connection = self.find_by_id_or_error(id).await?;
        let webhook = WebhookUrl::parse(url)?;

        if !connection.update_webhook_url(webhook.clone(), &*self.clock) {
            debug!(connection_id = %id, "webhook unchanged");
            return Ok(connection);
        }

        let stored = self
            .budget
            .run(
                self.connections
                    .set_webhook_url(id, &webhook, connection.updated_at()),
            )
            .await?;
        info!(connection_id = %id, "connection webhook updated");
        Ok(stored)
    }

    /// Sets the connection status from its text form.
    ///
    /// Activation requires both servers to be active at the time of the
    /// call; the user-delivery side is checked first. Deactivation has no
    /// precondition. Setting the current status is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionServiceError::Repository`] when the connection
    /// does not exist or persistence fails,
    /// [`ConnectionServiceError::Status`] when `status` is not recognised,
    /// [`ConnectionServiceError::ServerNotFound`] when a server is missing
    /// during activation, and [`ConnectionServiceError::ServerNotActive`]
    /// when a server is not active.
    pub async fn set_status(
        &self,
        id: ConnectionId,
        status: &str,
    ) -> ConnectionServiceResult<Connection> {
        let mut connection = self.find_by_id_or_error(id).await?;
        let target = Status::try_from(status)?;

        if connection.status() == target {
            debug!(connection_id = %id, %status, "status unchanged");
            return Ok(connection);
        }

        if target.is_active() {
            self.ensure_servers_active(connection.pair()).await?;
        }

        connection.transition_to(target, &*self.clock);
        let stored = self
            .budget
            .run(
                self.connections
                    .set_status(id, target, connection.updated_at()),
            )
            .await?;
        info!(connection_id = %id, status = %target, "connection status changed");
        Ok(stored)
    }

    async fn ensure_servers_active(&self, pair: ConnectionPair) -> ConnectionServiceResult<()> {
        let user_delivery = self
            .load_server(&*self.user_delivery_servers, pair.user_delivery)
            .await?;
        let webview = self.load_server(&*self.webview_servers, pair.webview).await?;

        if !user_delivery.status().is_active() {
            return Err(ConnectionServiceError::ServerNotActive(
                ServerRef::UserDelivery(pair.user_delivery),
            ));
        }
        if !webview.status().is_active() {
            return Err(ConnectionServiceError::ServerNotActive(
                ServerRef::Webview(pair.webview),
            ));
        }
        Ok(())
    }

    async fn load_server<K, R>(
        &self,
        repository: &R,
        id: ServerId<K>,
    ) -> ConnectionServiceResult<Server<K>>
    where
        K: ServerKind,
        R: ServerRepository<K>,
    {
        self.budget
            .run(repository.find_by_id(id))
            .await?
            .ok_or_else(|| ConnectionServiceError::ServerNotFound(K::reference(id)))
    }

    async fn webview_summary(&self, id: ServerId<Webview>) -> Option<ServerSummary<Webview>> {
        match self.budget.run(self.webview_servers.find_by_id(id)).await {
            Ok(server) => server.as_ref().map(Server::summary),
            Err(err) => {
                warn!(webview_server_id = %id, error = %err, "webview server summary unavailable");
                None
            }
        }
    }

    async fn find_by_id_or_error(&self, id: ConnectionId) -> ConnectionServiceResult<Connection> {
        self.budget
            .run(self.connections.find_by_id(id))
            .await?
            .ok_or_else(|| ConnectionRepositoryError::NotFound(id).into())
    }
}
