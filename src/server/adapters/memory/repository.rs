//! In-memory repository for server registrations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::pagination::{Page, PageRequest};
use crate::server::{
    domain::{PersistedServerData, Server, ServerId, ServerKind, ServerName},
    ports::{ServerFilter, ServerRepository, ServerRepositoryError, ServerRepositoryResult},
};
use crate::status::Status;

/// Thread-safe in-memory server repository for one server kind.
#[derive(Debug, Clone, Default)]
pub struct InMemoryServerRepository<K: ServerKind> {
    state: Arc<RwLock<InMemoryServerState<K>>>,
}

#[derive(Debug, Default)]
struct InMemoryServerState<K: ServerKind> {
    servers: HashMap<ServerId<K>, Server<K>>,
    name_index: HashMap<ServerName, ServerId<K>>,
    insertion_order: Vec<ServerId<K>>,
}

impl<K: ServerKind> InMemoryServerRepository<K> {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ServerRepositoryResult<RwLockReadGuard<'_, InMemoryServerState<K>>> {
        self.state.read().map_err(|err| {
            ServerRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> ServerRepositoryResult<RwLockWriteGuard<'_, InMemoryServerState<K>>> {
        self.state.write().map_err(|err| {
            ServerRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl<K: ServerKind> ServerRepository<K> for InMemoryServerRepository<K> {
    async fn insert(&self, server: &Server<K>) -> ServerRepositoryResult<()> {
        let mut state = self.write()?;

        if state.servers.contains_key(&server.id()) {
            return Err(ServerRepositoryError::DuplicateServer(K::reference(
                server.id(),
            )));
        }

        if state.name_index.contains_key(server.name()) {
            return Err(ServerRepositoryError::DuplicateName {
                kind: K::TAG,
                name: server.name().clone(),
            });
        }

        state.name_index.insert(server.name().clone(), server.id());
        state.insertion_order.push(server.id());
        state.servers.insert(server.id(), server.clone());
        Ok(())
    }

    async fn rename(
        &self,
        id: ServerId<K>,
        name: &ServerName,
        at: DateTime<Utc>,
    ) -> ServerRepositoryResult<Server<K>> {
        let mut state = self.write()?;

        if let Some(&indexed_id) = state.name_index.get(name)
            && indexed_id != id
        {
            return Err(ServerRepositoryError::DuplicateName {
                kind: K::TAG,
                name: name.clone(),
            });
        }

        let stored = state
            .servers
            .get_mut(&id)
            .ok_or_else(|| ServerRepositoryError::NotFound(K::reference(id)))?;
        let old_name = stored.name().clone();
        let renamed = rewritten(stored, name.clone(), stored.status(), at);
        *stored = renamed.clone();

        state.name_index.remove(&old_name);
        state.name_index.insert(name.clone(), id);
        Ok(renamed)
    }

    async fn set_status(
        &self,
        id: ServerId<K>,
        status: Status,
        at: DateTime<Utc>,
    ) -> ServerRepositoryResult<Server<K>> {
        let mut state = self.write()?;
        let stored = state
            .servers
            .get_mut(&id)
            .ok_or_else(|| ServerRepositoryError::NotFound(K::reference(id)))?;
        let updated = rewritten(stored, stored.name().clone(), status, at);
        *stored = updated.clone();
        Ok(updated)
    }

    async fn find_by_id(&self, id: ServerId<K>) -> ServerRepositoryResult<Option<Server<K>>> {
        let state = self.read()?;
        Ok(state.servers.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &ServerFilter,
        page: PageRequest,
    ) -> ServerRepositoryResult<Page<Server<K>>> {
        let state = self.read()?;
        let matching = state
            .insertion_order
            .iter()
            .filter_map(|id| state.servers.get(id))
            .filter(|server| filter.matches(*server))
            .cloned()
            .collect();
        Ok(page.slice(matching))
    }
}

/// Copy of `server` with the given mutable fields.
fn rewritten<K: ServerKind>(
    server: &Server<K>,
    name: ServerName,
    status: Status,
    updated_at: DateTime<Utc>,
) -> Server<K> {
    Server::from_persisted(PersistedServerData {
        id: server.id(),
        name,
        status,
        created_at: server.created_at(),
        updated_at,
    })
}
