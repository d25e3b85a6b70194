//! In-memory repository for connections.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::connection::{
    domain::{Connection, ConnectionId, ConnectionPair, PersistedConnectionData, WebhookUrl},
    ports::{
        ConnectionFilter, ConnectionRepository, ConnectionRepositoryError,
        ConnectionRepositoryResult,
    },
};
use crate::pagination::{Page, PageRequest};
use crate::server::domain::ServerRef;
use crate::status::Status;

/// Thread-safe in-memory connection repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConnectionRepository {
    state: Arc<RwLock<InMemoryConnectionState>>,
}

#[derive(Debug, Default)]
struct InMemoryConnectionState {
    connections: HashMap<ConnectionId, Connection>,
    pair_index: HashMap<ConnectionPair, ConnectionId>,
    insertion_order: Vec<ConnectionId>,
}

impl InMemoryConnectionState {
    fn ordered(&self) -> impl Iterator<Item = &Connection> {
        self.insertion_order
            .iter()
            .filter_map(|id| self.connections.get(id))
    }
}

impl InMemoryConnectionRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ConnectionRepositoryResult<RwLockReadGuard<'_, InMemoryConnectionState>> {
        self.state.read().map_err(|err| {
            ConnectionRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> ConnectionRepositoryResult<RwLockWriteGuard<'_, InMemoryConnectionState>> {
        self.state.write().map_err(|err| {
            ConnectionRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl ConnectionRepository for InMemoryConnectionRepository {
    async fn insert(&self, connection: &Connection) -> ConnectionRepositoryResult<()> {
        let mut state = self.write()?;

        if state.connections.contains_key(&connection.id()) {
            return Err(ConnectionRepositoryError::DuplicateConnection(
                connection.id(),
            ));
        }

        let pair = connection.pair();
        if state.pair_index.contains_key(&pair) {
            return Err(ConnectionRepositoryError::DuplicatePair(pair));
        }

        state.pair_index.insert(pair, connection.id());
        state.insertion_order.push(connection.id());
        state.connections.insert(connection.id(), connection.clone());
        Ok(())
    }

    async fn set_webhook_url(
        &self,
        id: ConnectionId,
        url: &WebhookUrl,
        at: DateTime<Utc>,
    ) -> ConnectionRepositoryResult<Connection> {
        let mut state = self.write()?;
        let stored = state
            .connections
            .get_mut(&id)
            .ok_or(ConnectionRepositoryError::NotFound(id))?;
        let updated = rewritten(stored, Some(url.clone()), stored.status(), at);
        *stored = updated.clone();
        Ok(updated)
    }

    async fn set_status(
        &self,
        id: ConnectionId,
        status: Status,
        at: DateTime<Utc>,
    ) -> ConnectionRepositoryResult<Connection> {
        let mut state = self.write()?;
        let stored = state
            .connections
            .get_mut(&id)
            .ok_or(ConnectionRepositoryError::NotFound(id))?;
        let updated = rewritten(stored, stored.webhook_url().cloned(), status, at);
        *stored = updated.clone();
        Ok(updated)
    }

    async fn find_by_id(&self, id: ConnectionId) -> ConnectionRepositoryResult<Option<Connection>> {
        let state = self.read()?;
        Ok(state.connections.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &ConnectionFilter,
        page: PageRequest,
    ) -> ConnectionRepositoryResult<Page<Connection>> {
        let state = self.read()?;
        let matching = state
            .ordered()
            .filter(|connection| filter.matches(connection))
            .cloned()
            .collect();
        Ok(page.slice(matching))
    }

    async fn find_by_server(&self, server: ServerRef) -> ConnectionRepositoryResult<Vec<Connection>> {
        let state = self.read()?;
        Ok(state
            .ordered()
            .filter(|connection| connection.pair().references(server))
            .cloned()
            .collect())
    }

    async fn deactivate_if_active(
        &self,
        id: ConnectionId,
        at: DateTime<Utc>,
    ) -> ConnectionRepositoryResult<bool> {
        let mut state = self.write()?;
        let stored = state
            .connections
            .get_mut(&id)
            .ok_or(ConnectionRepositoryError::NotFound(id))?;
        Ok(stored.deactivate_at(at))
    }
}

/// Copy of `connection` with the given mutable fields.
fn rewritten(
    connection: &Connection,
    webhook_url: Option<WebhookUrl>,
    status: Status,
    updated_at: DateTime<Utc>,
) -> Connection {
    Connection::from_persisted(PersistedConnectionData {
        id: connection.id(),
        pair: connection.pair(),
        webview_server_api_key: connection.webview_server_api_key().clone(),
        user_delivery_server_api_key: connection.user_delivery_server_api_key().clone(),
        webhook_url,
        status,
        created_at: connection.created_at(),
        updated_at,
    })
}
